// User directory: signup, admin review of faculty requests, lookups.

pub mod handlers;
