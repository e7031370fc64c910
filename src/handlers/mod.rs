// Handlers are split by security tier:
// public (no token required) and protected (bearer token with role USER).
pub mod protected;
pub mod public;
