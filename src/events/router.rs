//! Typed fan-out of inbound events.

use std::{marker::PhantomData, panic::AssertUnwindSafe};

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error};

use crate::{
    bot::Bot,
    events::{Event, EventPayload, Interest},
    utils::panic_message,
};

/// Code run when an event of payload type `E` happens.
///
/// Returning an error, or panicking, only aborts this handler: the router logs
/// the failure and carries on with the next handler.
#[async_trait]
pub trait EventHandler<E: EventPayload>: Send + Sync {
    /// Handles one event.
    async fn handle(&self, bot: &Bot, event: &E) -> anyhow::Result<()>;
}

/// Handler with its payload type erased, as stored by the router.
#[async_trait]
trait ErasedHandler: Send + Sync {
    fn interest(&self) -> Interest;
    fn name(&self) -> &'static str;
    async fn handle_event(&self, bot: &Bot, event: &Event) -> anyhow::Result<()>;
}

struct TypedHandler<E, H> {
    handler: H,
    payload: PhantomData<fn(&E)>,
}

#[async_trait]
impl<E, H> ErasedHandler for TypedHandler<E, H>
where
    E: EventPayload,
    H: EventHandler<E> + 'static,
{
    fn interest(&self) -> Interest {
        E::interest()
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<H>()
    }

    async fn handle_event(&self, bot: &Bot, event: &Event) -> anyhow::Result<()> {
        match E::extract(event) {
            Some(payload) => self.handler.handle(bot, payload).await,
            None => Ok(()),
        }
    }
}

/// Ordered list of event handlers.
///
/// Handlers are invoked sequentially, in registration order, each one running
/// to completion before the next starts.
#[derive(Default)]
pub struct EventRouter {
    handlers: Vec<Box<dyn ErasedHandler>>,
}

impl EventRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        EventRouter::default()
    }

    /// Appends `handler` to the router.
    ///
    /// The payload type `E` is usually inferred from the single
    /// [`EventHandler`] implementation of `H`.
    pub fn register<E, H>(&mut self, handler: H)
    where
        E: EventPayload,
        H: EventHandler<E> + 'static,
    {
        let handler = TypedHandler {
            handler,
            payload: PhantomData,
        };
        debug!(
            "registering event handler {} ({:?})",
            handler.name(),
            handler.interest()
        );
        self.handlers.push(Box::new(handler));
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every handler interested in `event`.
    ///
    /// Returns the number of handlers that were invoked, failed ones included.
    pub async fn dispatch(&self, bot: &Bot, event: &Event) -> usize {
        let kind = event.kind();
        let mut invoked = 0;

        for handler in self
            .handlers
            .iter()
            .filter(|handler| handler.interest().matches(kind))
        {
            invoked += 1;
            match AssertUnwindSafe(handler.handle_event(bot, event))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(
                    "event handler {} failed on {} event: {:#}",
                    handler.name(),
                    kind,
                    e
                ),
                Err(panic) => error!(
                    "event handler {} panicked on {} event: {}",
                    handler.name(),
                    kind,
                    panic_message(panic.as_ref())
                ),
            }
        }

        invoked
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        events::{MemberLeft, Ready, Shutdown},
        platform::{Guild, User},
    };

    type Journal = Arc<Mutex<Vec<String>>>;

    struct ReadyRecorder(Journal);

    #[async_trait]
    impl EventHandler<Ready> for ReadyRecorder {
        async fn handle(&self, _bot: &Bot, event: &Ready) -> anyhow::Result<()> {
            self.0
                .lock()
                .unwrap()
                .push(format!("ready:{}", event.guild_count));
            Ok(())
        }
    }

    struct MemberLeftRecorder(Journal);

    #[async_trait]
    impl EventHandler<MemberLeft> for MemberLeftRecorder {
        async fn handle(&self, _bot: &Bot, event: &MemberLeft) -> anyhow::Result<()> {
            self.0
                .lock()
                .unwrap()
                .push(format!("left:{}", event.user.name));
            Ok(())
        }
    }

    struct AnyRecorder(Journal);

    #[async_trait]
    impl EventHandler<Event> for AnyRecorder {
        async fn handle(&self, _bot: &Bot, event: &Event) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(format!("any:{}", event.kind()));
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler<Ready> for FailingHandler {
        async fn handle(&self, _bot: &Bot, _event: &Ready) -> anyhow::Result<()> {
            anyhow::bail!("database unavailable")
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl EventHandler<Ready> for PanickingHandler {
        async fn handle(&self, _bot: &Bot, _event: &Ready) -> anyhow::Result<()> {
            panic!("handler bug")
        }
    }

    fn create_ready_event() -> Event {
        Event::Ready(Ready {
            user: User {
                id: "0".to_string(),
                name: "switchboard".to_string(),
                bot: true,
            },
            guild_count: 3,
        })
    }

    #[tokio::test]
    async fn test_dispatch_only_matching_kind() {
        let journal = Journal::default();
        let mut router = EventRouter::new();
        router.register(ReadyRecorder(Arc::clone(&journal)));
        router.register(MemberLeftRecorder(Arc::clone(&journal)));

        let bot = Bot::for_tests();
        let invoked = router.dispatch(&bot, &create_ready_event()).await;

        assert_eq!(invoked, 1);
        assert_eq!(*journal.lock().unwrap(), vec!["ready:3".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_member_left() {
        let journal = Journal::default();
        let mut router = EventRouter::new();
        router.register(ReadyRecorder(Arc::clone(&journal)));
        router.register(MemberLeftRecorder(Arc::clone(&journal)));

        let event = Event::MemberLeft(MemberLeft {
            guild: Guild {
                id: "g".to_string(),
                name: "guild".to_string(),
            },
            user: User {
                id: "7".to_string(),
                name: "bob".to_string(),
                bot: false,
            },
        });
        let bot = Bot::for_tests();
        router.dispatch(&bot, &event).await;

        assert_eq!(*journal.lock().unwrap(), vec!["left:bob".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_keeps_registration_order() {
        let journal = Journal::default();
        let mut router = EventRouter::new();
        router.register(AnyRecorder(Arc::clone(&journal)));
        router.register(ReadyRecorder(Arc::clone(&journal)));
        router.register(AnyRecorder(Arc::clone(&journal)));

        let bot = Bot::for_tests();
        let invoked = router.dispatch(&bot, &create_ready_event()).await;

        assert_eq!(invoked, 3);
        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "any:ready".to_string(),
                "ready:3".to_string(),
                "any:ready".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_later_handlers() {
        let journal = Journal::default();
        let mut router = EventRouter::new();
        router.register(FailingHandler);
        router.register(PanickingHandler);
        router.register(ReadyRecorder(Arc::clone(&journal)));

        let bot = Bot::for_tests();
        let invoked = router.dispatch(&bot, &create_ready_event()).await;

        assert_eq!(invoked, 3);
        assert_eq!(*journal.lock().unwrap(), vec!["ready:3".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_without_interested_handler() {
        let journal = Journal::default();
        let mut router = EventRouter::new();
        router.register(ReadyRecorder(Arc::clone(&journal)));

        let bot = Bot::for_tests();
        let invoked = router.dispatch(&bot, &Event::Shutdown(Shutdown)).await;

        assert_eq!(invoked, 0);
        assert!(journal.lock().unwrap().is_empty());
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
    }
}
