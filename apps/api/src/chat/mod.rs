// Chat: scripted conversation steps that guide a client through upload and generation.
// Deterministic; no model call.

pub mod handlers;
