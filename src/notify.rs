//! User-facing banners derived from operation results.
//!
//! Feature modules only return results; whoever renders the UI picks a
//! [`Notice`] for each outcome and hands it to a [`Notifier`].

use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::{BackendError, BackendResult};
use crate::models::ListingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Banner for `result`, or `None` when the operation stays silent.
    ///
    /// Validation and credential errors show their own message; anything
    /// else gets the operation's generic failure text.
    pub fn for_outcome<T>(operation: Operation, result: &BackendResult<T>) -> Option<Self> {
        match result {
            Ok(_) => operation.success_message().map(Notice::success),
            Err(BackendError::Validation(message)) => Some(Notice::error(message.clone())),
            Err(BackendError::InvalidCredentials) => {
                Some(Notice::error(BackendError::InvalidCredentials.to_string()))
            }
            Err(_) => operation.failure_message().map(Notice::error),
        }
    }
}

/// User-facing actions that may produce a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadListings(ListingKind),
    FetchListing(ListingKind),
    CreateListing(ListingKind),
    UpdateListing(ListingKind),
    DeleteListing(ListingKind),
    LoadMessages,
    SendMessage,
    LoadFavorites,
    AddFavorite,
    RemoveFavorite,
    LoadReports,
    CreateReport,
    UpdateReport,
    SignUp,
    SignIn,
    SignOut,
    UpdateProfile,
    CheckConnection,
    InitializeDatabase,
    UploadFile,
}

/// (singular, plural)
fn noun(kind: ListingKind) -> (&'static str, &'static str) {
    match kind {
        ListingKind::Product => ("Producto", "productos"),
        ListingKind::Property => ("Inmueble", "inmuebles"),
        ListingKind::Service => ("Servicio", "servicios"),
    }
}

impl Operation {
    pub fn success_message(self) -> Option<String> {
        let message = match self {
            Operation::CreateListing(kind) => format!("¡{} publicado exitosamente!", noun(kind).0),
            Operation::UpdateListing(kind) => format!("{} actualizado exitosamente", noun(kind).0),
            Operation::DeleteListing(kind) => format!("{} eliminado exitosamente", noun(kind).0),
            Operation::SendMessage => "Mensaje enviado correctamente".to_string(),
            Operation::AddFavorite => "Agregado a favoritos".to_string(),
            Operation::RemoveFavorite => "Eliminado de favoritos".to_string(),
            Operation::CreateReport => {
                "Reporte enviado. Será revisado por nuestro equipo.".to_string()
            }
            Operation::UpdateReport => "Estado del reporte actualizado".to_string(),
            Operation::SignUp => "¡Cuenta creada exitosamente!".to_string(),
            Operation::SignIn => "¡Bienvenido de vuelta!".to_string(),
            Operation::SignOut => "Sesión cerrada exitosamente".to_string(),
            Operation::UpdateProfile => "Perfil actualizado exitosamente".to_string(),
            Operation::InitializeDatabase => "Modo demo activado - datos locales".to_string(),
            Operation::UploadFile => "Archivo subido".to_string(),
            Operation::LoadListings(_)
            | Operation::FetchListing(_)
            | Operation::LoadMessages
            | Operation::LoadFavorites
            | Operation::LoadReports
            | Operation::CheckConnection => return None,
        };
        Some(message)
    }

    pub fn failure_message(self) -> Option<String> {
        let message = match self {
            Operation::LoadListings(kind) => format!("Error al cargar {}", noun(kind).1),
            Operation::FetchListing(kind) => {
                format!("Error al cargar el {}", noun(kind).0.to_lowercase())
            }
            Operation::CreateListing(kind) => {
                format!("Error al publicar el {}", noun(kind).0.to_lowercase())
            }
            Operation::UpdateListing(kind) => {
                format!("Error al actualizar el {}", noun(kind).0.to_lowercase())
            }
            Operation::DeleteListing(kind) => {
                format!("Error al eliminar el {}", noun(kind).0.to_lowercase())
            }
            Operation::LoadMessages => "Error al cargar mensajes".to_string(),
            Operation::SendMessage => "Error al enviar el mensaje".to_string(),
            Operation::LoadFavorites => "Error al cargar favoritos".to_string(),
            Operation::AddFavorite => "Error al agregar a favoritos".to_string(),
            Operation::RemoveFavorite => "Error al eliminar de favoritos".to_string(),
            Operation::LoadReports => "Error al cargar reportes".to_string(),
            Operation::CreateReport => "Error al enviar reporte".to_string(),
            Operation::UpdateReport => "Error al actualizar reporte".to_string(),
            Operation::SignUp => "Error al crear la cuenta".to_string(),
            Operation::SignIn => "Error al iniciar sesión".to_string(),
            Operation::UpdateProfile => "Error al actualizar el perfil".to_string(),
            Operation::CheckConnection => "Error de conexión simulado".to_string(),
            Operation::InitializeDatabase => "Error al inicializar la base de datos".to_string(),
            Operation::UploadFile => "Error al subir el archivo".to_string(),
            Operation::SignOut => return None,
        };
        Some(message)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!("✅ {}", notice.message),
            NoticeLevel::Info => info!("ℹ️  {}", notice.message),
            NoticeLevel::Error => warn!("❌ {}", notice.message),
        }
    }
}

/// Keeps every notice, for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        let mut notices = self
            .notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        notices.push(notice);
    }
}

/// Pick the notice for `result` and send it, passing the result through.
pub fn report<T>(
    notifier: &dyn Notifier,
    operation: Operation,
    result: BackendResult<T>,
) -> BackendResult<T> {
    if let Some(notice) = Notice::for_outcome(operation, &result) {
        notifier.notify(notice);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_shows_its_own_text() {
        let result: BackendResult<()> = Err(BackendError::Validation(
            "El mensaje no puede estar vacío".to_string(),
        ));
        let notice = Notice::for_outcome(Operation::SendMessage, &result).unwrap();
        assert_eq!(notice, Notice::error("El mensaje no puede estar vacío"));
    }

    #[test]
    fn test_not_found_uses_generic_failure() {
        let result: BackendResult<()> = Err(BackendError::NotFound("products".to_string()));
        let notice =
            Notice::for_outcome(Operation::DeleteListing(ListingKind::Product), &result).unwrap();
        assert_eq!(notice.message, "Error al eliminar el producto");
    }

    #[test]
    fn test_loads_are_silent_on_success() {
        let result: BackendResult<()> = Ok(());
        assert!(Notice::for_outcome(Operation::LoadMessages, &result).is_none());
    }

    #[test]
    fn test_product_messages() {
        assert_eq!(
            Operation::CreateListing(ListingKind::Product).success_message().as_deref(),
            Some("¡Producto publicado exitosamente!")
        );
        assert_eq!(
            Operation::LoadListings(ListingKind::Product).failure_message().as_deref(),
            Some("Error al cargar productos")
        );
    }

    #[test]
    fn test_report_passes_result_through() {
        let notifier = RecordingNotifier::new();
        let result = report(&notifier, Operation::AddFavorite, Ok(5));
        assert_eq!(result.unwrap(), 5);
        assert_eq!(notifier.notices(), vec![Notice::success("Agregado a favoritos")]);
    }
}
