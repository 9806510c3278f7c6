mod details;
mod episodes;
mod nav;
mod recommend;

pub use details::cmd_details;
pub use episodes::cmd_episodes;
pub use nav::cmd_nav;
pub use recommend::cmd_recommend;
