// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware and extractors (authentication, JSON bodies, security headers).

pub mod auth;
pub mod json;
pub mod security;

pub use auth::{require_auth, AuthUser};
pub use json::JsonBody;
