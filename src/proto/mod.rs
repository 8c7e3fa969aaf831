pub mod bytecode;
pub mod command;
pub mod reply;
