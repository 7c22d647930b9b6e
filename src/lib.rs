//! # Time Control Backend
//!
//! Employee time-tracking service.
//!
//! This crate provides the backend of the Time Control application: employees log
//! their daily working hours, plan office/remote presence, and request vacations or
//! sick days, while administrators manage employees, review change requests, and
//! follow statistics. Working days follow the Latvian public holiday calendar.
//!
//! ## Features
//!
//! - **Time Tracking**: Time entries with break deduction, overlap checks and daily limits
//! - **Leave Management**: Sick days, excused days and vacations kept in sync with day statuses
//! - **Presence Planning**: Per-day workplace plans and office presence overviews
//! - **Statistics**: Daily, weekly and monthly aggregation per employee
//! - **Change Requests**: Employee proposals applied on admin approval
//! - **Notifications**: In-app notifications plus email reminders run in the background
//! - **HTTP API**: RESTful endpoints for the single-page frontend
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`config`]: Application configuration read from the environment
//! - [`models`]: Domain entities and value types
//! - [`db`]: Repository pattern and persistence layer
//! - [`services`]: Business rules on top of the repository
//! - [`jobs`]: Periodic reminder jobs
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;

pub mod db;
pub mod models;

pub mod jobs;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
