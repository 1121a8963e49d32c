//! Single-affinity dispatcher
//!
//! Rendering state is `!Send`: component instances, the render engine and the
//! component state store all assume a single owner. [`Dispatcher`] gives that
//! owner a dedicated OS thread running a current-thread tokio runtime with a
//! [`LocalSet`], and accepts work from any thread through a bounded channel.
//!
//! The value owned by the affinity (`S`) is built on the dispatcher thread by a
//! factory and never leaves it. Work items receive an `Rc<S>` and run as local
//! tasks, so several of them may be in flight and interleave at await points.
//! The dispatcher itself only holds a channel sender, which makes it
//! `Send + Sync` without `unsafe`.

use crate::error::RenderError;
use crate::settings::RendererSettings;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::mpsc as std_mpsc;
use std::thread::{self, ThreadId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::LocalSet;

type Job<S> = Box<dyn FnOnce(Rc<S>) -> LocalBoxFuture<'static, ()> + Send>;

/// Command sent to the dispatcher thread.
enum Command<S> {
	/// Run a work item as a local task.
	Invoke(Job<S>),
	/// Run `finalize` to completion, acknowledge and stop the thread.
	Shutdown {
		finalize: Job<S>,
		ack: oneshot::Sender<()>,
	},
}

/// Handle to a dedicated rendering thread that owns a value of type `S`.
///
/// # Examples
///
/// ```
/// use carryover_render::{Dispatcher, RendererSettings};
/// use std::cell::RefCell;
///
/// # futures::executor::block_on(async {
/// let dispatcher = Dispatcher::start(&RendererSettings::default(), || {
/// 	Ok(RefCell::new(Vec::<String>::new()))
/// })
/// .unwrap();
///
/// dispatcher
/// 	.invoke(|log| log.borrow_mut().push("first".to_string()))
/// 	.await
/// 	.unwrap();
/// let len = dispatcher.invoke(|log| log.borrow().len()).await.unwrap();
/// assert_eq!(len, 1);
///
/// dispatcher.shutdown(|_| async {}).await.unwrap();
/// # });
/// ```
pub struct Dispatcher<S> {
	command_tx: mpsc::Sender<Command<S>>,
	thread_id: ThreadId,
	thread_name: String,
}

impl<S: 'static> Dispatcher<S> {
	/// Spawns the dispatcher thread and builds the owned value on it.
	///
	/// Blocks until `factory` has run, so a failing factory is reported here.
	pub fn start<F>(settings: &RendererSettings, factory: F) -> Result<Self, RenderError>
	where
		F: FnOnce() -> Result<S, RenderError> + Send + 'static,
	{
		settings.validate()?;

		let (command_tx, command_rx) = mpsc::channel::<Command<S>>(settings.queue_capacity);
		let (init_tx, init_rx) = std_mpsc::channel::<Result<(), RenderError>>();

		let handle = thread::Builder::new()
			.name(settings.thread_name.clone())
			.spawn(move || dispatcher_thread_main(factory, command_rx, init_tx))
			.map_err(|e| RenderError::DispatcherStartup(e.to_string()))?;
		let thread_id = handle.thread().id();

		init_rx.recv().map_err(|_| {
			RenderError::DispatcherStartup(
				"dispatcher thread terminated during initialization".to_string(),
			)
		})??;

		tracing::debug!(
			thread = %settings.thread_name,
			queue_capacity = settings.queue_capacity,
			"Dispatcher started"
		);

		Ok(Self {
			command_tx,
			thread_id,
			thread_name: settings.thread_name.clone(),
		})
	}

	/// Runs `work` on the dispatcher thread and awaits its result.
	///
	/// Dropping the returned future does not stop work that has already been
	/// queued; the work runs to completion and its result is discarded.
	pub async fn invoke_async<F, Fut, R>(&self, work: F) -> Result<R, RenderError>
	where
		F: FnOnce(Rc<S>) -> Fut + Send + 'static,
		Fut: Future<Output = R> + 'static,
		R: Send + 'static,
	{
		let (response_tx, response_rx) = oneshot::channel();
		let job: Job<S> = Box::new(move |owned| {
			async move {
				let result = work(owned).await;
				let _ = response_tx.send(result);
			}
			.boxed_local()
		});

		self.command_tx
			.send(Command::Invoke(job))
			.await
			.map_err(|_| RenderError::DispatcherClosed)?;

		response_rx.await.map_err(|_| RenderError::Cancelled)
	}

	/// Runs synchronous `work` against the owned value on the dispatcher thread.
	pub async fn invoke<F, R>(&self, work: F) -> Result<R, RenderError>
	where
		F: FnOnce(&S) -> R + Send + 'static,
		R: Send + 'static,
	{
		self.invoke_async(move |owned| {
			let result = work(owned.as_ref());
			async move { result }
		})
		.await
	}

	/// Returns `true` when called from the dispatcher thread.
	pub fn check_access(&self) -> bool {
		thread::current().id() == self.thread_id
	}

	/// Returns `true` once the dispatcher thread has stopped accepting work.
	pub fn is_closed(&self) -> bool {
		self.command_tx.is_closed()
	}

	/// Name of the dispatcher thread.
	pub fn thread_name(&self) -> &str {
		&self.thread_name
	}

	/// Runs `finalize` on the dispatcher thread, then stops it.
	///
	/// Work queued before the shutdown request is started first. Local tasks
	/// still pending once `finalize` completes are dropped with the thread.
	pub async fn shutdown<F, Fut>(self, finalize: F) -> Result<(), RenderError>
	where
		F: FnOnce(Rc<S>) -> Fut + Send + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		let (ack_tx, ack_rx) = oneshot::channel();
		let finalize: Job<S> = Box::new(move |owned| finalize(owned).boxed_local());

		self.command_tx
			.send(Command::Shutdown {
				finalize,
				ack: ack_tx,
			})
			.await
			.map_err(|_| RenderError::DispatcherClosed)?;

		ack_rx.await.map_err(|_| RenderError::Cancelled)?;
		tracing::debug!(thread = %self.thread_name, "Dispatcher stopped");
		Ok(())
	}
}

impl<S> fmt::Debug for Dispatcher<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field("thread_name", &self.thread_name)
			.field("closed", &self.command_tx.is_closed())
			.finish()
	}
}

/// Main function of the dispatcher thread.
///
/// Owns the runtime, the local task set and the affinity value. Exits when a
/// shutdown command has been handled or every sender has been dropped.
fn dispatcher_thread_main<S, F>(
	factory: F,
	mut command_rx: mpsc::Receiver<Command<S>>,
	init_tx: std_mpsc::Sender<Result<(), RenderError>>,
) where
	S: 'static,
	F: FnOnce() -> Result<S, RenderError>,
{
	let runtime = match tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
	{
		Ok(runtime) => runtime,
		Err(e) => {
			let _ = init_tx.send(Err(RenderError::DispatcherStartup(e.to_string())));
			return;
		}
	};

	let local = LocalSet::new();
	local.block_on(&runtime, async move {
		let owned = match factory() {
			Ok(owned) => Rc::new(owned),
			Err(e) => {
				let _ = init_tx.send(Err(e));
				return;
			}
		};

		if init_tx.send(Ok(())).is_err() {
			// Caller stopped waiting for startup
			return;
		}

		while let Some(command) = command_rx.recv().await {
			match command {
				Command::Invoke(job) => {
					tokio::task::spawn_local(job(Rc::clone(&owned)));
				}
				Command::Shutdown { finalize, ack } => {
					command_rx.close();
					finalize(Rc::clone(&owned)).await;
					let _ = ack.send(());
					break;
				}
			}
		}
	});
}
