use std::thread;
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{Either, select};
use futures_timer::Delay;
use log::error;

/// Run `task` and wait at most `timeout` for its result.
///
/// With `None` the task runs on the calling thread and its result is always
/// returned. Otherwise it runs on a helper thread; `None` is returned if it
/// does not finish in time or panics. A task that overruns keeps running in
/// the background and its result is dropped.
pub(crate) fn wait_bounded<T, F>(timeout: Option<Duration>, task: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let Some(timeout) = timeout else {
        return Some(task());
    };

    let (sender, receiver) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("thingkit-blocking".into())
        .spawn(move || {
            let _ = sender.send(task());
        });
    if let Err(err) = spawned {
        error!("failed to spawn blocking helper: {err}");
        return None;
    }

    block_on(async move {
        match select(receiver, Box::pin(Delay::new(timeout))).await {
            Either::Left((Ok(value), _)) => Some(value),
            Either::Left((Err(_), _)) | Either::Right(_) => None,
        }
    })
}
