use std::collections::HashMap;
use std::path::PathBuf;

use logistics_engine::logistics::{
    AbortOutcome, DeliveryStatus, EndpointCapabilities, EndpointHandle, FastForwardMode,
    ProfileSet, ResourceContainer, ResourceKind, SaveFormat, SaveStore, SimulationClock,
    TRANSPORT_CREDITS, TransferKind, TransferRequest, TransferScheduler,
};
use logistics_engine::{SimTime, Units};

/// Host clock fixed at a point in time, in real-time mode.
struct Clock(SimTime);

impl SimulationClock for Clock {
    fn now(&self) -> SimTime {
        self.0
    }

    fn fast_forward_rate(&self) -> f64 {
        1.0
    }

    fn fast_forward_mode(&self) -> FastForwardMode {
        FastForwardMode::Low
    }
}

/// One container per (endpoint, resource).
#[derive(Default)]
struct Vessels {
    tanks: HashMap<(String, String), ResourceContainer>,
}

impl Vessels {
    fn with(mut self, endpoint: &str, resource: &str, amount: Units, capacity: Units) -> Self {
        self.tanks.insert(
            (endpoint.to_string(), resource.to_string()),
            ResourceContainer::new(amount, capacity),
        );
        self
    }

    fn amount(&self, endpoint: &str, resource: &str) -> Units {
        self.tanks
            .get(&(endpoint.to_string(), resource.to_string()))
            .map(|t| t.amount)
            .unwrap_or(0.0)
    }
}

impl EndpointCapabilities for Vessels {
    fn list_containers(
        &mut self,
        endpoint: &EndpointHandle,
        resource: &str,
    ) -> Vec<&mut ResourceContainer> {
        self.tanks
            .get_mut(&(endpoint.as_str().to_string(), resource.to_string()))
            .into_iter()
            .collect()
    }

    fn has_resource(&self, endpoint: &EndpointHandle, resource: &str) -> bool {
        self.tanks
            .contains_key(&(endpoint.as_str().to_string(), resource.to_string()))
    }

    fn available_transport_credits(&self, endpoint: &EndpointHandle) -> Units {
        self.amount(endpoint.as_str(), TRANSPORT_CREDITS)
    }
}

fn test_dir(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "target/test_save_reload_{}_{}",
        name,
        std::process::id()
    ))
}

fn fuel(amount: Units) -> TransferRequest {
    TransferRequest::new(
        TransferKind::Cargo,
        EndpointHandle::new("tanker"),
        EndpointHandle::new("outpost"),
        ResourceKind::new("LiquidFuel", 0.005),
        amount,
    )
}

fn vessels() -> Vessels {
    Vessels::default()
        .with("tanker", "LiquidFuel", 1000.0, 1000.0)
        .with("tanker", TRANSPORT_CREDITS, 500.0, 500.0)
        .with("outpost", "LiquidFuel", 0.0, 2000.0)
}

#[test]
fn save_and_reload_across_store_then_deliver() {
    let dir = test_dir("deliver");
    let _ = std::fs::remove_dir_all(&dir);

    let mut host = vessels();
    let mut scheduler = TransferScheduler::new(ProfileSet::default(), 0.0);
    let first = scheduler.submit(fuel(400.0), 0.0, &mut host).unwrap();
    let second = scheduler.submit(fuel(200.0), 100.0, &mut host).unwrap();
    let arrival = scheduler.registry().get(second).unwrap().arrival_time();
    assert!(arrival > 100.0);

    let store = SaveStore::new(dir.join("logistics.json"), SaveFormat::Json);
    store.save(&scheduler.save()).unwrap();

    let block = store.load().unwrap().expect("save file written");
    let mut reloaded = TransferScheduler::new(ProfileSet::default(), 100.0);
    reloaded.load(&block).unwrap();

    let ids: Vec<_> = reloaded.registry().pending().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![first, second]);

    let report = reloaded.tick(&Clock(arrival), &mut host);
    assert_eq!(
        report.completed,
        vec![
            (first, DeliveryStatus::Delivered),
            (second, DeliveryStatus::Delivered)
        ]
    );
    assert_eq!(host.amount("outpost", "LiquidFuel"), 600.0);
    assert_eq!(host.amount("tanker", "LiquidFuel"), 400.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn aborted_then_cleared_record_is_gone_after_reload() {
    let dir = test_dir("abort");
    let _ = std::fs::remove_dir_all(&dir);

    let mut host = vessels();
    let mut scheduler = TransferScheduler::new(ProfileSet::default(), 0.0);
    let id = scheduler.submit(fuel(100.0), 0.0, &mut host).unwrap();
    assert_eq!(
        scheduler.abort_transfer(id).unwrap(),
        AbortOutcome::MarkedForAbort
    );

    let arrival = scheduler.registry().get(id).unwrap().arrival_time();
    scheduler.tick(&Clock(arrival), &mut host);
    assert_eq!(scheduler.status_of(id), Ok(DeliveryStatus::Aborted));
    assert_eq!(host.amount("tanker", TRANSPORT_CREDITS), 500.0);

    let store = SaveStore::new(dir.join("logistics.yaml"), SaveFormat::Yaml);
    store.save(&scheduler.save()).unwrap();
    let mut reloaded = TransferScheduler::new(ProfileSet::default(), 0.0);
    reloaded.load(&store.load().unwrap().unwrap()).unwrap();
    assert!(reloaded.registry().is_expired(id));

    reloaded.clear_expired();
    store.save(&reloaded.save()).unwrap();
    let block = store.load().unwrap().unwrap();
    assert!(block.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}
