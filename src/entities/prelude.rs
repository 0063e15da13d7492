pub use super::bid_list::Entity as BidList;
pub use super::curve_point::Entity as CurvePoint;
pub use super::rating::Entity as Rating;
pub use super::rule_name::Entity as RuleName;
pub use super::trade::Entity as Trade;
pub use super::users::Entity as Users;
