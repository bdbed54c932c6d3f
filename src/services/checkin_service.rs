// ==================== CHECKIN WRITE HANDLER ====================
// Disparado a cada escrita (create/update/delete) em usuarios/{uid}/checkins/{checkinId}
// Lê o documento do usuário pai; se não existir, registra no log e encerra

use crate::{
    database::DocumentStore,
    models::{Change, EventContext},
    utils::error::AppError,
};
use serde::Serialize;

pub const CHECKIN_TRIGGER_PATH: &str = "usuarios/{uid}/checkins/{checkinId}";
pub const USERS_COLLECTION: &str = "usuarios";
pub const USER_NOT_FOUND_MESSAGE: &str = "Usuário não encontrado:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckinOutcome {
    UserFound,
    UserNotFound,
}

/// Uma leitura, nenhuma escrita. Erros do banco são propagados (a plataforma decide o retry).
/// O tipo de alteração não muda o comportamento: delete segue o mesmo caminho.
pub async fn on_checkin_write(
    store: &dyn DocumentStore,
    _change: &Change,
    context: &EventContext,
) -> Result<CheckinOutcome, AppError> {
    let uid = context
        .param("uid")
        .ok_or_else(|| AppError::InvalidEvent("missing uid path parameter".to_string()))?;

    let user = store.get(&format!("{}/{}", USERS_COLLECTION, uid)).await?;
    if !user.exists() {
        log::info!("{} {}", USER_NOT_FOUND_MESSAGE, uid);
        return Ok(CheckinOutcome::UserNotFound);
    }

    // lógica de prêmios ou atualizações aqui

    Ok(CheckinOutcome::UserFound)
}
