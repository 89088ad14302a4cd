use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProfileRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxAdminRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxChatRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxEmbeddingRepo {
    pub pool: PgPool,
}
