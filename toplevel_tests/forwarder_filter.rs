//! Forwarder device: a subscriber should only see topics it subscribed to.

use bytes::Bytes;
use monocoque_zmtp::proxy::Forwarder;
use monocoque_zmtp::publisher::PubSocket;
use std::thread;
use std::time::Duration;

#[test]
fn subscriber_only_sees_subscribed_topic() {
    let frontend_port = portpicker::pick_unused_port().expect("no free port");
    let backend_port = portpicker::pick_unused_port().expect("no free port");
    let frontend_addr = format!("127.0.0.1:{frontend_port}");
    let backend_addr = format!("127.0.0.1:{backend_port}");

    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    {
        let frontend_addr = frontend_addr.clone();
        let backend_addr = backend_addr.clone();
        thread::spawn(move || {
            compio::runtime::Runtime::new().unwrap().block_on(async move {
                let forwarder = Forwarder::bind(&frontend_addr, &backend_addr).await.unwrap();
                let running = forwarder.spawn();
                ready_tx.send(()).unwrap();
                let _ = running.task.await;
            });
        });
    }

    ready_rx.recv().unwrap();

    // Real SUB client subscribes to "T" only, via the device's XPUB backend.
    let ctx = zmq::Context::new();
    let sub = ctx.socket(zmq::SUB).unwrap();
    sub.connect(&format!("tcp://{backend_addr}")).unwrap();
    sub.set_subscribe(b"T").unwrap();
    thread::sleep(Duration::from_millis(150));

    // Our own publisher connects to the device's XSUB frontend.
    {
        let frontend_addr = frontend_addr.clone();
        thread::spawn(move || {
            compio::runtime::Runtime::new().unwrap().block_on(async move {
                let stream = compio::net::TcpStream::connect(&frontend_addr).await.unwrap();
                let mut publisher = PubSocket::new(stream).await.unwrap();
                compio::time::sleep(Duration::from_millis(100)).await;
                publisher
                    .send(vec![Bytes::from("T"), Bytes::from("wanted")])
                    .await
                    .unwrap();
                publisher
                    .send(vec![Bytes::from("U"), Bytes::from("unwanted")])
                    .await
                    .unwrap();
            });
        });
    }

    let topic = sub.recv_string(0).unwrap().unwrap();
    let body = sub.recv_string(0).unwrap().unwrap();
    assert_eq!(topic, "T");
    assert_eq!(body, "wanted");

    // The "U" message was never forwarded to this subscriber.
    thread::sleep(Duration::from_millis(150));
    assert!(sub.recv_string(zmq::DONTWAIT).is_err());
}
