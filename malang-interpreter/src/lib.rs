pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod loader;
pub mod macro_expansion;
pub mod object;
