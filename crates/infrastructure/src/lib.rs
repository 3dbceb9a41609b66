pub mod hosts;
pub mod repositories;
pub mod responder;
pub mod system;
