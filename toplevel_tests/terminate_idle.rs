//! Terminating a context must unblock a device that is sitting idle.

use monocoque_core::context::Context;
use monocoque_core::error::Error;
use monocoque_core::own::Linger;
use monocoque_zmtp::proxy::Forwarder;

#[compio::test]
async fn terminate_while_idle_unblocks_forwarder() {
    let frontend_port = portpicker::pick_unused_port().expect("no free port");
    let backend_port = portpicker::pick_unused_port().expect("no free port");

    let context = Context::new();
    let forwarder = Forwarder::bind_with_context(
        &format!("127.0.0.1:{frontend_port}"),
        &format!("127.0.0.1:{backend_port}"),
        Some(context.clone()),
    )
    .await
    .unwrap();

    let running = forwarder.spawn();

    // No publisher, no subscriber, no traffic: the device is idle.
    context.terminate(Linger::Immediate);

    let result = running.task.await;
    let err = result.expect_err("idle device must exit once the context terminates");
    let inner = err
        .into_inner()
        .and_then(|e| e.downcast::<Error>().ok())
        .expect("device error must wrap the termination cause");
    assert!(matches!(*inner, Error::Term));
}
