/*
 * Responsibility
 * - access: request 毎に credential を検証し AuthCtx を載せる (認証)
 * - gate: route の requirement と AuthCtx から proceed/401/403 を決める (認可)
 */
pub mod access;
pub mod gate;
