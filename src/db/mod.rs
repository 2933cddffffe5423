pub mod connection;
pub mod goals;
pub(crate) mod schema;
pub(crate) mod test_utils;

pub use connection::{DbPool, init_db};
pub use goals::{
    get_all_goals, get_goal_by_id, insert_goal, seed_initial_goals, update_goal,
};
