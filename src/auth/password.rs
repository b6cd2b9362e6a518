use crate::error::AppError;

/// bcrypt is CPU bound; both calls run on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("hash failed: {}", e)))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("verify failed: {}", e)))
}
