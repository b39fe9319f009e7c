//! Persistence hook.

/// Host-supplied persistence step run by
/// [`HistoryEngine::acknowledge_save`](crate::HistoryEngine::acknowledge_save).
///
/// The engine clears its dirty flag only when `save` returns `Ok`. Any
/// `FnMut() -> anyhow::Result<()>` closure is a handler.
pub trait SaveHandler {
    fn save(&mut self) -> anyhow::Result<()>;
}

impl<F> SaveHandler for F
where
    F: FnMut() -> anyhow::Result<()>,
{
    fn save(&mut self) -> anyhow::Result<()> {
        self()
    }
}
