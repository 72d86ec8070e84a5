use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;

use edittrigger_kernel::{
    ActionScript, HttpMethod, KernelConfig, RetryPolicy, ScriptId, TriggerKernel, WriteEvent,
};
use edittrigger_net_watch::NetWatchConfig;
use edittrigger_registry::RecordingRunner;
use edittrigger_route_watch::RouteWatchConfig;

fn fast_config() -> KernelConfig {
    KernelConfig {
        bus_capacity: 32,
        route: RouteWatchConfig {
            debounce_ms: 20,
            poll_interval_ms: 25,
        },
        net: NetWatchConfig { debounce_ms: 30 },
        retry: RetryPolicy {
            max_attempts: 30,
            delay_ms: 10,
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn url_flip_runs_matching_scripts_end_to_end() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new());
    let kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/app/bom/7?mode=edit",
    );

    kernel
        .store()
        .publish(vec![
            ActionScript::new("bom-sync", "Sync rows {tab: bom, mode: onEdit}"),
            ActionScript::new("grid-job", "Recount {tab: grid, mode: onEdit}"),
        ])
        .await;

    kernel.observe_address("https://plm.example/app/bom/7?mode=view");
    sleep(Duration::from_millis(150)).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ScriptId::new("bom-sync"));
    assert_eq!(calls[0].1["when"], "url-edit-to-view");
    assert_eq!(calls[0].1["tab"], "bom");

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn write_burst_coalesces_into_one_dispatch() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new());
    let kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/app/bom/7?mode=view",
    );

    kernel
        .store()
        .publish(vec![ActionScript::new(
            "bom-sync",
            "Sync rows {tab: bom, mode: onEdit}",
        )])
        .await;

    for row in ["11", "12", "13"] {
        kernel.record_request(WriteEvent::new(
            format!("/api/v3/workspaces/42/items/7/bom-items/{row}"),
            HttpMethod::Patch,
            true,
        ));
        sleep(Duration::from_millis(5)).await;
    }
    sleep(Duration::from_millis(200)).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1, "burst must collapse to one dispatch");
    assert_eq!(calls[0].1["when"], "network-write");
    assert_eq!(calls[0].1["write"], "bom");

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn attachment_write_targets_item_details_scripts() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new());
    let kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/ws/9/itemDetails?mode=view",
    );

    kernel
        .store()
        .publish(vec![
            ActionScript::new("att-job", "Refresh {tab: itemDetails, mode: onEdit}"),
            ActionScript::new("bom-job", "Sync {tab: bom, mode: onEdit}"),
        ])
        .await;

    kernel.record_request(WriteEvent::new(
        "/api/v3/workspaces/9/items/4/attachments",
        HttpMethod::Post,
        true,
    ));
    sleep(Duration::from_millis(150)).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, ScriptId::new("att-job"));
    assert_eq!(calls[0].1["tab"], "itemDetails");

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn late_registry_publish_does_not_lose_the_dispatch() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new());
    let kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/app/bom/7?mode=edit",
    );

    // Flip before the loader has published anything.
    kernel.observe_address("https://plm.example/app/bom/7?mode=view");
    sleep(Duration::from_millis(60)).await;
    assert_eq!(runner.call_count(), 0);

    kernel
        .store()
        .publish(vec![ActionScript::new(
            "bom-sync",
            "Sync rows {tab: bom, mode: onEdit}",
        )])
        .await;
    sleep(Duration::from_millis(150)).await;

    assert_eq!(runner.call_count(), 1);

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_script_does_not_block_its_peers() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new());
    runner.fail_script(ScriptId::new("first"));
    let kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/app/bom/7?mode=edit",
    );

    kernel
        .store()
        .publish(vec![
            ActionScript::new("first", "A {tab: bom, mode: onEdit}"),
            ActionScript::new("second", "B {tab: bom, mode: onEdit}"),
        ])
        .await;

    kernel.observe_address("https://plm.example/app/bom/7?mode=view");
    sleep(Duration::from_millis(150)).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, ScriptId::new("second"));

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn poll_driven_flip_reaches_the_runner() -> Result<()> {
    use parking_lot::Mutex;

    struct HostAddress {
        href: Mutex<String>,
    }
    impl edittrigger_kernel::AddressProvider for HostAddress {
        fn current_href(&self) -> String {
            self.href.lock().clone()
        }
    }

    let runner = Arc::new(RecordingRunner::new());
    let mut kernel = TriggerKernel::start(
        fast_config(),
        Arc::clone(&runner) as Arc<dyn edittrigger_kernel::ScriptRunner>,
        "https://plm.example/app/bom/7?mode=edit",
    );
    let provider = Arc::new(HostAddress {
        href: Mutex::new("https://plm.example/app/bom/7?mode=edit".to_string()),
    });
    kernel.attach_address_poll(Arc::clone(&provider) as Arc<dyn edittrigger_kernel::AddressProvider>);

    kernel
        .store()
        .publish(vec![ActionScript::new(
            "bom-sync",
            "Sync rows {tab: bom, mode: onEdit}",
        )])
        .await;

    *provider.href.lock() = "https://plm.example/app/bom/7?mode=view".to_string();
    sleep(Duration::from_millis(250)).await;

    assert_eq!(runner.call_count(), 1);

    kernel.shutdown().await.expect("kernel shutdown");
    Ok(())
}
