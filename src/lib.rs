pub mod certificate;
pub mod config;
pub mod skill;
pub mod verification;
pub mod version;
pub mod web;
