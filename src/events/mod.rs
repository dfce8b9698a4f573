/*!
 * Events Module
 * Runner-to-scheduler event channel and scheduler-to-presentation notifications
 */

pub mod channel;
pub mod notify;

pub use channel::{channel, EventReceiver, EventSender, RunnerEvent, RunnerEventKind};
pub use notify::{Notification, NotificationBus};
