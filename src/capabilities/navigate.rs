use serde::{Deserialize, Serialize};
use crux_core::capability::{Capability, CapabilityContext, Operation};

/// Screen-change requests handed to the shell. The core never navigates
/// itself; the shell owns the navigation stack and performs the transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigateOperation {
    ToSignin,
}

impl Operation for NavigateOperation {
    type Output = ();
}

#[derive(Clone)]
pub struct Navigate<E> {
    context: CapabilityContext<NavigateOperation, E>,
}

impl<Ev> Capability<Ev> for Navigate<Ev> {
    type Operation = NavigateOperation;
    type MappedSelf<MappedEv> = Navigate<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Navigate::new(self.context.map_event(f))
    }
}

impl<E> Navigate<E>
where
    E: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<NavigateOperation, E>) -> Self {
        Self { context }
    }

    /// Fire-and-forget: no result comes back from the shell.
    pub fn to_signin(&self) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(NavigateOperation::ToSignin).await;
        });
    }
}
