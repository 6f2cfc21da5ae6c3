use parking_lot::Mutex;
use std::sync::Arc;

/// Valeur partagée entre tâches, verrouillée en bloc
pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}
