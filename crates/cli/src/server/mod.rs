pub mod responder;

pub use responder::start_responder;
