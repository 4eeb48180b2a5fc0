use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use arbcti_codec::Fields;
use arbcti_frame::{FrameConfig, MessageReader, MessageWriter};
use arbcti_msg::{ChannelStatus, CommandFeedback, Direction, LoginFeedback, MessageKind};
use arbcti_spoofer::{SpooferConfig, SpooferServer, StoreError};

fn start_server(num_channels: usize) -> SpooferServer {
    let config = SpooferConfig {
        accept_timeout_s: 0.05,
        receive_timeout_s: 0.05,
        ..SpooferConfig::ephemeral(num_channels)
    };
    let mut server = SpooferServer::bind(&config).expect("spoofer should bind");
    server.start().expect("spoofer should start");
    server
}

struct TestClient {
    reader: MessageReader<TcpStream>,
    writer: MessageWriter<TcpStream>,
}

impl TestClient {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("client should connect");
        let config = FrameConfig::with_timeout(Duration::from_secs(3));
        let reader = MessageReader::with_config_tcp(
            stream.try_clone().expect("stream should clone"),
            config.clone(),
        )
        .expect("reader should configure");
        let writer = MessageWriter::with_config_tcp(stream, config).expect("writer should configure");
        Self { reader, writer }
    }

    fn call(&mut self, kind: MessageKind, overrides: Fields) -> Fields {
        let request = kind
            .pack(Direction::Client, &overrides)
            .expect("request should pack");
        self.writer.send(&request).expect("request should send");
        let response = self.reader.read_message().expect("response should arrive");
        kind.unpack(Direction::Server, &response)
            .expect("response should unpack")
    }

    fn status(&mut self, channel: i32) -> ChannelStatus {
        let fields = self.call(MessageKind::ChannelInfo, Fields::new().with("channel", channel));
        ChannelStatus::from_fields(&fields).expect("status view should decode")
    }
}

#[test]
fn login_reports_channel_count() {
    let server = start_server(8);
    let mut client = TestClient::connect(server.local_addr());

    let fields = client.call(
        MessageKind::Login,
        Fields::new().with("username", "operator").with("password", "secret"),
    );
    let login = LoginFeedback::from_fields(&fields).expect("login view should decode");
    assert!(login.is_success());
    assert_eq!(login.num_channels, 8);
}

#[test]
fn channel_status_follows_updates() {
    let server = start_server(16);
    let mut client = TestClient::connect(server.local_addr());

    let initial = client.status(5);
    assert_eq!(initial.channel, 5);
    assert_eq!(initial.status, "Idle");
    assert_eq!(initial.voltage_v, 0.0);
    assert_eq!(initial.current_a, 0.0);
    let neighbour = client.status(6);

    server
        .update_channel_status(
            5,
            Fields::new().with("voltage_v", 2.69f32).with("current_a", 1.19f32),
        )
        .expect("update should apply");

    let updated = client.status(5);
    assert!((updated.voltage_v - 2.69).abs() < 1e-4);
    assert!((updated.current_a - 1.19).abs() < 1e-4);
    assert_eq!(client.status(6), neighbour);
}

#[test]
fn invalid_update_leaves_served_record_alone() {
    let server = start_server(2);
    let mut client = TestClient::connect(server.local_addr());
    let before = client.status(1);

    let err = server
        .update_channel_status(1, Fields::new().with("voltage_v", 1.0f32).with("volts", 1.0f32))
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownField { .. }));
    let err = server
        .update_channel_status(2, Fields::new().with("voltage_v", 1.0f32))
        .unwrap_err();
    assert!(matches!(err, StoreError::ChannelOutOfRange { .. }));

    assert_eq!(client.status(1), before);
}

#[test]
fn aux_readings_are_served() {
    let server = start_server(4);
    server
        .update_channel_status(
            0,
            Fields::new()
                .with("aux_voltage", vec![3.1f32, 3.2])
                .with("aux_temperature", vec![22.5f32]),
        )
        .expect("aux update should apply");

    let mut client = TestClient::connect(server.local_addr());
    let status = client.status(0);
    assert_eq!(status.aux_voltage, vec![3.1, 3.2]);
    assert_eq!(status.aux_temperature, vec![22.5]);
}

#[test]
fn commands_get_success_feedback() {
    let server = start_server(4);
    let mut client = TestClient::connect(server.local_addr());

    for kind in [
        MessageKind::AssignSchedule,
        MessageKind::StartSchedule,
        MessageKind::StopSchedule,
        MessageKind::SetMetaVariable,
        MessageKind::JumpChannel,
    ] {
        let fields = client.call(kind, Fields::new().with("channel", 2));
        let feedback = CommandFeedback::from_fields(&fields).expect("feedback should decode");
        assert!(feedback.is_success(), "{kind}");
        assert_eq!(feedback.channel, 2, "{kind}");
    }
}

#[test]
fn serves_concurrent_clients() {
    let server = start_server(4);
    let addr = server.local_addr();

    let clients: Vec<_> = (0..4)
        .map(|channel| {
            thread::spawn(move || {
                let mut client = TestClient::connect(addr);
                for _ in 0..10 {
                    assert_eq!(client.status(channel).channel, channel as u32);
                }
            })
        })
        .collect();
    for c in clients {
        c.join().expect("client thread should finish");
    }
}

#[test]
fn stop_disconnects_clients() {
    let mut server = start_server(1);
    let mut client = TestClient::connect(server.local_addr());
    client.status(0);
    assert!(server.is_running());

    let started = Instant::now();
    server.stop();
    assert!(!server.is_running());
    assert!(started.elapsed() < Duration::from_secs(2));

    let request = MessageKind::ChannelInfo
        .pack(Direction::Client, &Fields::new())
        .expect("request should pack");
    let outcome = client
        .writer
        .send(&request)
        .and_then(|()| client.reader.read_message().map(|_| ()));
    assert!(outcome.is_err());

    server.stop();
}

#[test]
fn start_twice_is_rejected() {
    let mut server = start_server(1);
    assert!(server.start().is_err());
}
