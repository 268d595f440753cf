/*
 * Responsibility
 * - ドメインサービス (認証・トークン・時刻) の公開
 */
pub mod auth;
pub mod clock;
