//! Costs and the endpoint for adding them.

mod core;
mod create_endpoint;

pub use core::{
    BACKDATE_TOLERANCE, CostEntry, NewCost, create_cost, create_cost_table,
    get_costs_in_range, get_total_cost_for_user,
};
pub use create_endpoint::create_cost_endpoint;
