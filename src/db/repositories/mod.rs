pub mod bid_list;
pub mod curve_point;
pub mod rating;
pub mod rule_name;
pub mod trade;
pub mod user;
