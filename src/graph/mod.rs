pub mod collaborator;
pub mod manager;
pub mod pipeline;
pub mod template;
