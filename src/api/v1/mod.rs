/*
 * Responsibility
 * - v1 の公開ポイント (routes / extractors の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod routes;
