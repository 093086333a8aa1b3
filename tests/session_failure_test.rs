//! Session behavior under store failures, driven through mocked store
//! clients whose request streams are answered by the test.

use std::sync::Arc;
use std::time::Duration;

use lunchpoll::clients::{OrderClient, UserClient};
use lunchpoll::model::{Order, OrderDraft, PollCreate, User, UserId};
use lunchpoll::notify::{RecordingNotifier, Severity};
use lunchpoll::session::{SessionActor, SessionContext, SessionHandle, SessionView};
use lunchpoll::store::mock::{expect_get, expect_get_many, expect_put, expect_watch, mock_client};
use lunchpoll::store::{StoreError, Subscription};
use tokio::sync::broadcast;

async fn eventually(session: &SessionHandle, pred: impl Fn(&SessionView) -> bool) -> SessionView {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let view = session.view();
            if pred(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session view never reached the expected state")
}

#[tokio::test]
async fn failed_submit_notifies_and_leaves_state_unchanged() {
    // Real poll and user collections, mocked order store.
    let (poll_actor, polls) = lunchpoll::poll_actor::new(8, 8);
    tokio::spawn(poll_actor.run());
    let (user_actor, users) = lunchpoll::user_actor::new(8, 8);
    tokio::spawn(user_actor.run());

    let (order_store, mut order_requests) = mock_client::<Order>(8);
    let orders = OrderClient::new(order_store);

    let notifier = RecordingNotifier::new();
    let poll = polls.create(PollCreate::default()).await.unwrap();
    let session = SessionActor::spawn(
        Some(poll.id.clone()),
        Some(UserId::from("user_1")),
        SessionContext {
            polls,
            orders,
            users,
            notifier: Arc::new(notifier.clone()),
        },
    );

    // Initialization: own-order fetch, then the orders subscription.
    let (_, _, respond) = expect_get(&mut order_requests).await.expect("own-order fetch");
    respond.send(Ok(None)).unwrap();

    let (snapshots, _) = broadcast::channel(8);
    let (_, respond) = expect_watch(&mut order_requests).await.expect("orders subscription");
    respond
        .send(Ok(Subscription {
            initial: Vec::new(),
            updates: snapshots.subscribe(),
        }))
        .unwrap();

    eventually(&session, |view| !view.loading).await;

    // The write fails; the session reports it and keeps its state.
    let submit = {
        let session_draft = OrderDraft {
            dish: "Ramen".to_string(),
            notes: None,
            cost: 12.5,
        };
        let session = &session;
        async move { session.submit_order(session_draft).await }
    };
    let answer = async {
        let (_, respond) = expect_put(&mut order_requests).await.expect("submit write");
        respond.send(Err(StoreError::Closed)).unwrap();
    };
    tokio::join!(submit, answer);

    let notices = notifier.notices();
    assert!(notices
        .iter()
        .any(|notice| notice.title == "Error" && notice.severity == Severity::Error));

    let view = session.view();
    assert!(view.user_order.is_none());
    assert!(view.orders.is_empty());
    assert!(!view.submitting);

    session.shutdown().await;
}

#[tokio::test]
async fn failed_enrichment_keeps_the_previous_order_list() {
    // Real poll and order collections, mocked user directory.
    let (poll_actor, polls) = lunchpoll::poll_actor::new(8, 8);
    tokio::spawn(poll_actor.run());
    let (order_actor, orders) = lunchpoll::order_actor::new(8, 8);
    tokio::spawn(order_actor.run());

    let (user_store, mut user_requests) = mock_client::<User>(8);
    let users = UserClient::new(user_store);

    let notifier = RecordingNotifier::new();
    let poll = polls.create(PollCreate::default()).await.unwrap();
    let session = SessionActor::spawn(
        Some(poll.id.clone()),
        Some(UserId::from("user_1")),
        SessionContext {
            polls,
            orders: orders.clone(),
            users,
            notifier: Arc::new(notifier.clone()),
        },
    );

    // Initial empty snapshot resolves fine.
    let (_, ids, respond) = expect_get_many(&mut user_requests).await.expect("initial lookup");
    assert!(ids.is_empty());
    respond.send(Ok(Vec::new())).unwrap();
    eventually(&session, |view| !view.loading).await;

    // A new order arrives but the name lookup fails: the previous (empty)
    // list must be kept rather than rendered half-enriched.
    orders
        .submit(
            &poll.id,
            &UserId::from("user_2"),
            OrderDraft {
                dish: "Kebab".to_string(),
                notes: None,
                cost: 7.0,
            },
        )
        .await
        .unwrap();
    let (_, _, respond) = expect_get_many(&mut user_requests).await.expect("failing lookup");
    respond.send(Err(StoreError::Closed)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.view().orders.is_empty());

    // The next snapshot heals the list.
    orders
        .submit(
            &poll.id,
            &UserId::from("user_3"),
            OrderDraft {
                dish: "Pizza".to_string(),
                notes: None,
                cost: 9.25,
            },
        )
        .await
        .unwrap();
    let (_, ids, respond) = expect_get_many(&mut user_requests).await.expect("healing lookup");
    assert_eq!(ids.len(), 2);
    respond
        .send(Ok(vec![User::new("user_2", "Bob"), User::new("user_3", "Carol")]))
        .unwrap();

    let view = eventually(&session, |view| view.orders.len() == 2).await;
    assert!(view.orders.iter().any(|o| o.user_name == "Bob"));
    assert!(view.orders.iter().any(|o| o.user_name == "Carol"));

    session.shutdown().await;
}
