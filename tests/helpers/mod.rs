// ABOUTME: Test helper modules shared by integration tests
// ABOUTME: HTTP request builders for exercising Axum routers

pub mod axum_test;
