use std::io::Write;
use std::net::{Shutdown, TcpListener};
use std::thread;

use arbcti_client::{
    ChannelConfig, ChannelInterface, ClientError, Credentials, CyclerConfig, CyclerInterface,
};
use arbcti_codec::Fields;
use arbcti_frame::MessageReader;
use arbcti_msg::{Direction, MessageKind};
use arbcti_spoofer::{SpooferConfig, SpooferServer};

fn spoofer(num_channels: usize) -> SpooferServer {
    let config = SpooferConfig {
        accept_timeout_s: 0.05,
        receive_timeout_s: 0.05,
        ..SpooferConfig::ephemeral(num_channels)
    };
    let mut server = SpooferServer::bind(&config).expect("spoofer should bind");
    server.start().expect("spoofer should start");
    server
}

fn cycler_config(server: &SpooferServer) -> CyclerConfig {
    let addr = server.local_addr();
    CyclerConfig::new(addr.ip().to_string(), addr.port())
}

fn credentials() -> Credentials {
    Credentials::new("operator", "secret")
}

#[test]
fn cycler_logs_in_and_reads_status() {
    let server = spoofer(16);
    let mut cycler =
        CyclerInterface::connect(&cycler_config(&server), &credentials()).expect("should connect");
    assert_eq!(cycler.num_channels(), 16);
    assert!(cycler.login_feedback().is_success());

    server
        .update_channel_status(5, Fields::new().with("voltage_v", 2.69f32))
        .expect("update should apply");

    // Channel 6 is wire index 5.
    let status = cycler.read_channel_status(6).expect("status should be read");
    assert_eq!(status.channel, 5);
    assert!((status.voltage_v - 2.69).abs() < 1e-4);

    let other = cycler.read_channel_status(5).expect("status should be read");
    assert_eq!(other.channel, 4);
    assert_eq!(other.voltage_v, 0.0);
}

#[test]
fn unused_readings_reported_as_nan_still_read() {
    let server = spoofer(2);
    let mut cycler =
        CyclerInterface::connect(&cycler_config(&server), &credentials()).expect("should connect");

    server
        .update_channel_status(
            0,
            Fields::new()
                .with("voltage_v", f64::NAN)
                .with("current_a", f64::INFINITY),
        )
        .expect("update should apply");

    let status = cycler.read_channel_status(1).expect("status should be read");
    assert!(status.voltage_v.is_nan());
    assert_eq!(status.current_a, f64::INFINITY);
}

#[test]
fn invalid_channel_numbers_return_none() {
    let server = spoofer(4);
    let mut cycler =
        CyclerInterface::connect(&cycler_config(&server), &credentials()).expect("should connect");

    assert!(cycler.read_channel_status(0).is_none());
    assert!(cycler.read_channel_status(5).is_none());
    assert!(matches!(
        cycler.try_read_channel_status(5),
        Err(ClientError::InvalidChannel { channel: 5, num_channels: 4 })
    ));
    assert!(cycler.is_connected());
    assert!(cycler.read_channel_status(4).is_some());
}

#[test]
fn connect_to_closed_port_fails() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        listener.local_addr().expect("addr").port()
    };
    let err = CyclerInterface::connect(&CyclerConfig::new("127.0.0.1", port), &credentials())
        .unwrap_err();
    assert!(matches!(err, ClientError::Connect { .. }));
}

#[test]
fn login_failure_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("addr");

    let fake = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut reader = MessageReader::new(stream.try_clone().expect("clone"));
        reader.read_message().expect("login request should arrive");
        let response = MessageKind::Login
            .pack(Direction::Server, &Fields::new().with("result", 2u32))
            .expect("response should pack");
        let mut stream = stream;
        stream.write_all(&response).expect("response should send");
        let _ = stream.shutdown(Shutdown::Both);
    });

    let err = CyclerInterface::connect(
        &CyclerConfig::new(addr.ip().to_string(), addr.port()),
        &credentials(),
    )
    .unwrap_err();
    assert!(matches!(err, ClientError::LoginRejected { ref result } if result == "fail"));
    fake.join().expect("fake cycler should finish");
}

#[test]
fn channel_interface_runs_commands() {
    let server = spoofer(8);
    let config = ChannelConfig::new(3, cycler_config(&server))
        .with_test_name("formation")
        .with_schedule_name("form.sdx");
    let mut channel = ChannelInterface::connect(&config, &credentials()).expect("should connect");

    let status = channel.read_channel_status().expect("status should be read");
    assert_eq!(status.channel, 2);

    assert!(channel.assign_schedule());
    assert!(channel.start_test());
    assert!(channel.set_meta_variable(1, 0.5));
    assert!(channel.set_meta_variable(16, -2.0));
    assert!(channel.jump_to_step(4));
    assert!(channel.stop_test());

    let feedback = channel.try_stop_test().expect("stop should succeed");
    assert_eq!(feedback.channel, 2);
}

#[test]
fn channel_commands_need_their_config() {
    let server = spoofer(2);
    let config = ChannelConfig::new(1, cycler_config(&server));
    let mut channel = ChannelInterface::connect(&config, &credentials()).expect("should connect");

    assert!(!channel.assign_schedule());
    assert!(!channel.start_test());
    assert!(!channel.set_meta_variable(0, 1.0));
    assert!(!channel.set_meta_variable(17, 1.0));
    assert!(channel.cycler().is_connected());
    assert!(channel.stop_test());
}

#[test]
fn channel_beyond_cycler_is_refused_at_connect() {
    let server = spoofer(2);
    let config = ChannelConfig::new(3, cycler_config(&server));
    let err = ChannelInterface::connect(&config, &credentials()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidChannel { channel: 3, num_channels: 2 }));
}

#[test]
fn session_is_lost_after_server_stops() {
    let mut server = spoofer(2);
    let mut cycler =
        CyclerInterface::connect(&cycler_config(&server), &credentials()).expect("should connect");
    assert!(cycler.read_channel_status(1).is_some());

    server.stop();
    assert!(cycler.read_channel_status(1).is_none());
    assert!(!cycler.is_connected());
    assert!(matches!(
        cycler.try_read_channel_status(1),
        Err(ClientError::ConnectionLost)
    ));
}
