//! Core domain models for accessibility audits

pub mod audit;
