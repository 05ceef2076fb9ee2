use std::sync::mpsc;
use std::thread;

use engine::{NotificationReceiver, NotificationSender, PlayerNotification};
use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};

const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;

/// Messages emitted by the player bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// The player library is loaded; players publish through this sender.
    Ready(NotificationSender),
    Notification(PlayerNotification),
    Disconnected,
}

/// Builds a subscription that opens the player notification channel and
/// forwards notifications to the update loop.
pub fn player_subscription() -> Subscription<BridgeEvent> {
    Subscription::run(bridge_worker_stream)
}

fn bridge_worker_stream() -> impl iced::futures::Stream<Item = BridgeEvent> {
    bridge_worker_stream_with(mpsc::channel)
}

fn bridge_worker_stream_with(
    open_channel: fn() -> (NotificationSender, NotificationReceiver),
) -> impl iced::futures::Stream<Item = BridgeEvent> {
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (notification_tx, notification_rx) = open_channel();
            let _ = output.send(BridgeEvent::Ready(notification_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(notification) = notification_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Notification(notification)))
                        .is_err()
                    {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use engine::{PlayerEvent, PlayerNotification, PlayerState, SessionId};
    use iced::futures::{StreamExt, executor, pin_mut};

    use super::{BridgeEvent, bridge_worker_stream_with};

    #[test]
    fn bridge_worker_stream_emits_ready_forwards_notifications_and_disconnected() {
        let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeEvent>();

        thread::spawn(move || {
            let stream = bridge_worker_stream_with(mpsc::channel);
            executor::block_on(async move {
                pin_mut!(stream);
                for _ in 0..3 {
                    let Some(event) = stream.next().await else {
                        break;
                    };
                    if bridge_tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        let ready = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("ready event");
        let BridgeEvent::Ready(notification_tx) = ready else {
            panic!("expected BridgeEvent::Ready");
        };

        let notification = PlayerNotification {
            session: SessionId(4),
            event: PlayerEvent::StateChanged(PlayerState::Playing),
        };
        notification_tx
            .send(notification)
            .expect("send notification");

        let forwarded = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("forwarded notification");
        let BridgeEvent::Notification(received) = forwarded else {
            panic!("expected BridgeEvent::Notification");
        };
        assert_eq!(received, notification);

        drop(notification_tx);

        let disconnected = bridge_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("disconnected event");
        assert!(matches!(disconnected, BridgeEvent::Disconnected));
    }
}
