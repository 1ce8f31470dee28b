mod database;
mod jwt;
mod redis;

pub use self::database::{ConnectionManager, ConnectionPool};
pub use self::jwt::{Claims, JwtConfig, TokenKind};
pub use self::redis::RedisClient;
