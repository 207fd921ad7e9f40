use async_trait::async_trait;
use statlink::{
    build_frame, encode_frame, Config, FanCalibration, HardwareKind, HardwareNode, HardwareSource,
    Notifier, Result, SampleLoop, SensorKind, SensorReading, SnapshotAggregator, TelemetryError,
    TransportManager,
};
use statlink::hardware::StaticNode;
use statlink::transport::SerialEndpoint;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Hardware source backed by a scripted list of nodes.
struct FakeSource {
    nodes: Vec<Box<dyn HardwareNode>>,
}

impl FakeSource {
    fn new(nodes: Vec<StaticNode>) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|n| Box::new(n) as Box<dyn HardwareNode>)
                .collect(),
        }
    }
}

impl HardwareSource for FakeSource {
    fn nodes(&mut self) -> Result<&mut [Box<dyn HardwareNode>]> {
        Ok(&mut self.nodes)
    }
}

/// Volume probe for a machine where no volume is ready.
struct NoVolumes;

impl statlink::VolumeProbe for NoVolumes {
    fn free_bytes(&mut self, _volume: &str) -> Option<u64> {
        None
    }
}

/// Serial endpoint that records written lines and counts lifecycle calls.
struct RecordingEndpoint {
    lines: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl RecordingEndpoint {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let closes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                lines: lines.clone(),
                closes: closes.clone(),
            },
            lines,
            closes,
        )
    }
}

#[async_trait]
impl SerialEndpoint for RecordingEndpoint {
    fn endpoint_name(&self) -> &str {
        "recording"
    }

    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn connected(&self, _endpoint: &str) {}
    fn degraded(&self, _message: &str) {}
}

/// The tree from the end-to-end scenario: one CPU temperature, the CPU fan
/// on the motherboard controller, RAM at 42%, everything else absent.
fn sparse_tree() -> Vec<StaticNode> {
    vec![
        StaticNode::new(
            HardwareKind::Cpu,
            "CPU",
            vec![SensorReading::new(
                SensorKind::Temperature,
                "CPU Package",
                55.3,
            )],
        ),
        StaticNode::new(HardwareKind::Motherboard, "Board", vec![]).with_child(StaticNode::new(
            HardwareKind::EmbeddedController,
            "Nuvoton EC",
            vec![SensorReading::new(SensorKind::Fan, "CPU Fan", 1125.0)],
        )),
        StaticNode::new(
            HardwareKind::Memory,
            "Memory",
            vec![SensorReading::new(SensorKind::Data, "Memory Used", 42.0)],
        ),
    ]
}

fn test_config() -> Config {
    Config::new("fake", 115_200)
        .with_cpu_fan_max_rpm(2250)
        .with_gpu_fan_max_rpm(3500)
}

/// A sparse tree with a not-ready volume produces exactly the golden line.
#[test]
fn test_end_to_end_golden_line() {
    let config = test_config();
    let aggregator = SnapshotAggregator::new(config.volumes.clone());
    let mut source = FakeSource::new(sparse_tree());

    let snapshot = aggregator.collect(&mut source, &mut NoVolumes).unwrap();
    let frame = build_frame(&snapshot, 77, &FanCalibration::from(&config));
    let line = encode_frame(&frame);

    assert_eq!(
        line,
        "CPU:55.3,GPU:0.0,RAM:42.0,CPUPWR:0,CPUCLK:0,CPUUSE:0,CPUFAN:50,\
         GPUPWR:0,GPUCLK:0,GPUUSE:0,GPUFAN:0,UPTIME:77,\
         DISKC:0.0,DISKD:0.0,DISKE:0.0,WIFIDN:0.0,WIFIUP:0.0\n"
    );
}

/// Two adapters reporting different download speeds aggregate to the larger
/// value, never the sum.
#[test]
fn test_dual_adapter_download_takes_max() {
    let config = test_config();
    let aggregator = SnapshotAggregator::new(config.volumes.clone());
    let mut source = FakeSource::new(vec![
        StaticNode::new(
            HardwareKind::Network,
            "wlan0",
            vec![SensorReading::new(
                SensorKind::Throughput,
                "Download Speed",
                10.0,
            )],
        ),
        StaticNode::new(
            HardwareKind::Network,
            "eth0",
            vec![SensorReading::new(
                SensorKind::Throughput,
                "Download Speed",
                50.0,
            )],
        ),
    ]);

    let snapshot = aggregator.collect(&mut source, &mut NoVolumes).unwrap();
    assert_eq!(snapshot.wifi_down_bps, 50.0);
}

/// The full loop drives the pipeline: the first recorded line matches the
/// direct aggregate-convert-encode result.
#[tokio::test(start_paused = true)]
async fn test_loop_writes_the_encoded_frame() {
    let config = test_config();
    let (endpoint, lines, closes) = RecordingEndpoint::new();
    let driver = SampleLoop::new(
        &config,
        FakeSource::new(sparse_tree()),
        NoVolumes,
        endpoint,
        Arc::new(QuietNotifier),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(driver.run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    task.await.unwrap();

    let sent = lines.lock().unwrap();
    assert!(!sent.is_empty());
    assert!(sent[0].starts_with("CPU:55.3,GPU:0.0,RAM:42.0,"));
    assert!(sent[0].contains("CPUFAN:50,"));
    assert!(sent[0].ends_with('\n'));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

/// An endpoint that refuses to open twice before succeeding walks the
/// transport through Closed, Closed, Open.
#[tokio::test]
async fn test_transport_reconnect_cycle() {
    struct FlakyEndpoint {
        failures_left: usize,
    }

    #[async_trait]
    impl SerialEndpoint for FlakyEndpoint {
        fn endpoint_name(&self) -> &str {
            "flaky"
        }

        async fn open(&mut self) -> Result<()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(TelemetryError::transport("device not ready"));
            }
            Ok(())
        }

        async fn write_line(&mut self, _line: &str) -> Result<()> {
            Ok(())
        }

        async fn close(&mut self) {}
    }

    let mut manager = TransportManager::new(
        FlakyEndpoint { failures_left: 2 },
        Arc::new(QuietNotifier),
    );

    use statlink::ConnectionState;
    assert!(manager.ensure_open().await.is_err());
    assert_eq!(manager.state(), ConnectionState::Closed);
    assert!(manager.ensure_open().await.is_err());
    assert_eq!(manager.state(), ConnectionState::Closed);
    assert!(manager.ensure_open().await.is_ok());
    assert_eq!(manager.state(), ConnectionState::Open);

    manager.send("CPU:0.0\n").await.unwrap();
}

/// Config defaults mirror the documented cadence and calibration.
#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.interval_ms, statlink::DEFAULT_INTERVAL_MS);
    assert_eq!(config.backoff_ms, statlink::FAILURE_BACKOFF_MS);
    assert_eq!(config.cpu_fan_max_rpm, 2250);
    assert_eq!(config.gpu_fan_max_rpm, 3500);
    assert!(config.validate().is_ok());
}
