pub mod admin;
pub mod auth;
pub mod comment;
pub mod dashboard;
pub mod donation;
pub mod moderation;
pub mod notification;
pub mod project;
pub mod project_update;
pub mod rating;
pub mod sector;
pub mod webhook;
