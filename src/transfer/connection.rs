//! Per-connection AXFR protocol state machine.
//!
//! One [`TransferConnection`] owns one TCP connection to one master and
//! is never shared across transfers. It drives the wire codec through the
//! SOA-serial pre-check and the full AXFR exchange, handing records to
//! the caller one at a time as they come off the wire (RFC 5936).

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::XfrConfig;
use crate::dns::{
    Message,
    enums::{RrClass, RrType},
    record::Record,
};
use crate::error::{Result, XfrError};
use crate::store::ZoneSink;
use crate::transfer::TransferOutcome;
use crate::transport::{Transport, TransportFactory};
use crate::wire;

/// Protocol phase of one transfer attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnState {
    Idle,
    Connected,
    SoaChecking,
    Querying,
    Streaming,
    Done,
    Failed,
}

pub struct TransferConnection {
    zone_name: String,
    rclass: RrClass,
    master: SocketAddr,
    factory: Arc<dyn TransportFactory>,
    transport: Option<Box<dyn Transport>>,
    idle_timeout: Duration,
    reject_empty_axfr: bool,
    last_qid: Option<u16>,
    state: ConnState,
}

impl TransferConnection {
    pub fn new(
        zone_name: impl Into<String>,
        rclass: RrClass,
        master: SocketAddr,
        factory: Arc<dyn TransportFactory>,
        config: &XfrConfig,
    ) -> Self {
        Self {
            zone_name: zone_name.into(),
            rclass,
            master,
            factory,
            transport: None,
            idle_timeout: config.idle_timeout,
            reject_empty_axfr: config.reject_empty_axfr,
            last_qid: None,
            state: ConnState::Idle,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Establish the TCP connection to the master. The address family
    /// follows the resolved master address.
    pub async fn connect(&mut self) -> Result<()> {
        let transport = self
            .factory
            .connect(self.master)
            .await
            .map_err(|e| XfrError::ConnectError(e.to_string()))?;
        self.transport = Some(transport);
        self.state = ConnState::Connected;
        debug!("zone {}: connected to master {}", self.zone_name, self.master);
        Ok(())
    }

    /// Drop the connection. Idempotent; called on every exit path.
    pub fn close(&mut self) {
        self.transport = None;
        self.last_qid = None;
    }

    async fn send_query(&mut self, qtype: RrType) -> Result<()> {
        let (qid, framed) = wire::build_query(&self.zone_name, self.rclass, qtype)?;
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| XfrError::ConnectError("not connected".to_string()))?;
        transport
            .write_all(&framed)
            .await
            .map_err(|_| XfrError::PeerClosed)?;
        self.last_qid = Some(qid);
        debug!(
            "zone {}: sent {:?} query qid {:#06x}",
            self.zone_name, qtype, qid
        );
        Ok(())
    }

    /// One framed read-and-validate cycle. `on_eof` classifies a clean
    /// peer close, which means different things during the SOA pre-check
    /// and mid-stream.
    async fn read_response(&mut self, on_eof: fn() -> XfrError) -> Result<Message> {
        let idle_timeout = self.idle_timeout;
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| XfrError::ConnectError("not connected".to_string()))?;
        let payload = wire::read_frame(transport.as_mut(), idle_timeout)
            .await?
            .ok_or_else(on_eof)?;
        let message = wire::parse_response(&payload)?;
        self.validate_response(&message)?;
        Ok(message)
    }

    /// Validation applied to every response, pre-check and stream alike.
    fn validate_response(&self, message: &Message) -> Result<()> {
        let want = self
            .last_qid
            .ok_or_else(|| XfrError::ConnectError("no query outstanding".to_string()))?;
        if message.header.id != want {
            return Err(XfrError::QidMismatch {
                want,
                got: message.header.id,
            });
        }
        if !message.header.qr {
            return Err(XfrError::NotAResponse);
        }
        if message.header.rcode != 0 {
            return Err(XfrError::ServerError(message.header.rcode));
        }
        if message.questions.len() != 1 {
            return Err(XfrError::QuestionCountMismatch(message.questions.len() as u16));
        }
        Ok(())
    }

    /// Query the master's SOA and return its serial.
    ///
    /// Purely advisory: nothing in this connection acts on the result.
    /// A caller tracking the zone's stored serial uses it to decide
    /// whether the full pull is worth making.
    pub async fn check_soa_serial(&mut self) -> Result<u32> {
        self.state = ConnState::SoaChecking;
        self.send_query(RrType::SOA).await?;
        let message = self.read_response(|| XfrError::PeerClosed).await?;
        let serial = message
            .answers
            .iter()
            .find(|r| r.rtype == RrType::SOA)
            .and_then(|r| r.soa_serial())
            .ok_or(XfrError::EmptyAnswerSection)?;
        debug!("zone {}: master serial {}", self.zone_name, serial);
        Ok(serial)
    }

    /// Send the AXFR query and return the record stream.
    pub async fn transfer(&mut self) -> Result<RecordStream<'_>> {
        self.state = ConnState::Querying;
        self.send_query(RrType::AXFR).await?;
        self.state = ConnState::Streaming;
        Ok(RecordStream {
            conn: self,
            pending: VecDeque::new(),
            soa_seen: 0,
            serial: None,
            finished: false,
        })
    }

    /// Run a whole transfer attempt: connect, optional SOA pre-check,
    /// AXFR into the sink. Every failure path closes the connection and
    /// collapses to `Fail`; only a correctly terminated stream commits.
    pub async fn run(&mut self, do_soa_check: bool, sink: &mut dyn ZoneSink) -> TransferOutcome {
        let result = self.run_inner(do_soa_check, sink).await;
        self.close();
        match result {
            Ok(records) => {
                info!(
                    "zone {}: transfer from {} complete, {} records",
                    self.zone_name, self.master, records
                );
                self.state = ConnState::Done;
                TransferOutcome::Ok { records }
            }
            Err(e) => {
                warn!(
                    "zone {}: transfer from {} failed: {}",
                    self.zone_name, self.master, e
                );
                self.state = ConnState::Failed;
                TransferOutcome::Fail
            }
        }
    }

    async fn run_inner(&mut self, do_soa_check: bool, sink: &mut dyn ZoneSink) -> Result<u64> {
        self.connect().await?;
        if do_soa_check {
            let serial = self.check_soa_serial().await?;
            info!(
                "zone {}: master {} reports serial {}",
                self.zone_name, self.master, serial
            );
        }

        let mut records = 0u64;
        let serial;
        {
            let mut stream = self.transfer().await?;
            while let Some(record) = stream.next_record().await? {
                sink.add_record(&record)?;
                records += 1;
            }
            serial = stream.serial().ok_or(XfrError::UnexpectedEndOfTransfer)?;
        }
        sink.commit(serial)?;
        Ok(records)
    }
}

/// Lazy, single-pass stream of transferred records.
///
/// `next_record` performs at most one blocking read-and-validate cycle.
/// The second top-level SOA is recognized as the end-of-transfer marker:
/// its serial is captured and the record itself is never yielded. The
/// stream is not restartable.
pub struct RecordStream<'a> {
    conn: &'a mut TransferConnection,
    pending: VecDeque<Record>,
    soa_seen: u8,
    serial: Option<u32>,
    finished: bool,
}

impl RecordStream<'_> {
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if let Some(record) = self.pending.pop_front() {
                if record.rtype == RrType::SOA {
                    self.soa_seen += 1;
                    if self.soa_seen == 2 {
                        self.serial = record.soa_serial();
                        self.finished = true;
                        self.conn.state = ConnState::Done;
                        continue;
                    }
                }
                return Ok(Some(record));
            }

            let message = self
                .conn
                .read_response(|| XfrError::UnexpectedEndOfTransfer)
                .await?;
            if message.answers.is_empty() && self.conn.reject_empty_axfr {
                return Err(XfrError::EmptyAnswerSection);
            }
            self.pending.extend(message.answers);
        }
    }

    /// Serial from the terminating SOA; `None` until the stream has ended
    /// correctly.
    pub fn serial(&self) -> Option<u32> {
        self.serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::header::Header;
    use crate::dns::name_to_labels;
    use crate::dns::question::Question;
    use crate::store::FileZoneSink;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, DuplexStream};

    const TEST_ZONE: &str = "example.com.";

    fn soa_record(serial: u32) -> Record {
        let mut rdata = Vec::new();
        rdata.extend_from_slice(b"\x06master\x07example\x03com\x00");
        rdata.extend_from_slice(b"\x05admin\x07example\x03com\x00");
        rdata.extend_from_slice(&serial.to_be_bytes());
        rdata.extend_from_slice(&3600u32.to_be_bytes());
        rdata.extend_from_slice(&1800u32.to_be_bytes());
        rdata.extend_from_slice(&2419200u32.to_be_bytes());
        rdata.extend_from_slice(&7200u32.to_be_bytes());
        Record {
            labels: name_to_labels(TEST_ZONE),
            rtype: RrType::SOA,
            rclass: RrClass::IN,
            ttl: 3600,
            rdata,
        }
    }

    fn a_record(name: &str) -> Record {
        Record {
            labels: name_to_labels(name),
            rtype: RrType::A,
            rclass: RrClass::IN,
            ttl: 300,
            rdata: vec![192, 0, 2, 1],
        }
    }

    /// Knobs for building one deliberately shaped response, mirroring the
    /// failure modes the validator must catch.
    struct ResponseOpts {
        bad_qid: bool,
        response: bool,
        rcode: u8,
        questions: Vec<Question>,
        answers: Vec<Record>,
    }

    impl Default for ResponseOpts {
        fn default() -> Self {
            Self {
                bad_qid: false,
                response: true,
                rcode: 0,
                questions: vec![Question::new(
                    name_to_labels(TEST_ZONE),
                    RrType::AXFR,
                    RrClass::IN,
                )],
                answers: vec![soa_record(1234)],
            }
        }
    }

    fn build_response(qid: u16, opts: &ResponseOpts) -> Vec<u8> {
        let message = Message {
            header: Header {
                id: if opts.bad_qid { qid.wrapping_add(1) } else { qid },
                qr: opts.response,
                rcode: opts.rcode,
                qdcount: opts.questions.len() as u16,
                ancount: opts.answers.len() as u16,
                ..Default::default()
            },
            questions: opts.questions.clone(),
            answers: opts.answers.clone(),
            ..Default::default()
        };
        wire::frame(&message.serialize().unwrap())
    }

    /// Factory that hands out a pre-built duplex transport once.
    struct MockFactory(Mutex<Option<DuplexStream>>);

    impl MockFactory {
        fn new(transport: DuplexStream) -> Arc<Self> {
            Arc::new(Self(Mutex::new(Some(transport))))
        }
    }

    #[async_trait]
    impl TransportFactory for MockFactory {
        async fn connect(&self, _master: SocketAddr) -> std::io::Result<Box<dyn Transport>> {
            self.0
                .lock()
                .take()
                .map(|t| Box::new(t) as Box<dyn Transport>)
                .ok_or_else(|| std::io::Error::other("transport already taken"))
        }
    }

    /// Factory whose connect always fails.
    struct RefusingFactory;

    #[async_trait]
    impl TransportFactory for RefusingFactory {
        async fn connect(&self, _master: SocketAddr) -> std::io::Result<Box<dyn Transport>> {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        }
    }

    fn test_config() -> XfrConfig {
        XfrConfig {
            idle_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }

    fn connection_pair(config: XfrConfig) -> (TransferConnection, DuplexStream) {
        let (client, server) = tokio::io::duplex(1 << 16);
        let conn = TransferConnection::new(
            TEST_ZONE,
            RrClass::IN,
            "127.0.0.1:53".parse().unwrap(),
            MockFactory::new(client),
            &config,
        );
        (conn, server)
    }

    /// Read one framed query off the server side and return its qid.
    async fn read_query(server: &mut DuplexStream) -> u16 {
        let mut prefix = [0u8; 2];
        server.read_exact(&mut prefix).await.unwrap();
        let len = u16::from_be_bytes(prefix) as usize;
        let mut payload = vec![0u8; len];
        server.read_exact(&mut payload).await.unwrap();
        let query = Message::parse(&payload).unwrap();
        assert!(!query.header.qr);
        query.header.id
    }

    /// Connect, send the AXFR query, and reply with one shaped response.
    async fn axfr_with_response(opts: ResponseOpts) -> Result<Option<Record>> {
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await?;
        let qid = read_query(&mut server).await;
        tokio::io::AsyncWriteExt::write_all(&mut server, &build_response(qid, &opts))
            .await
            .unwrap();
        stream.next_record().await
    }

    #[tokio::test]
    async fn connect_refused() {
        let config = test_config();
        let mut conn = TransferConnection::new(
            TEST_ZONE,
            RrClass::IN,
            "127.0.0.1:53".parse().unwrap(),
            Arc::new(RefusingFactory),
            &config,
        );
        assert!(matches!(
            conn.connect().await,
            Err(XfrError::ConnectError(_))
        ));
    }

    #[tokio::test]
    async fn response_bad_qid() {
        let err = axfr_with_response(ResponseOpts {
            bad_qid: true,
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, XfrError::QidMismatch { .. }));
    }

    #[tokio::test]
    async fn response_not_a_response() {
        let err = axfr_with_response(ResponseOpts {
            response: false,
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, XfrError::NotAResponse));
    }

    #[tokio::test]
    async fn response_error_rcode() {
        // SERVFAIL aborts even though a valid answer is present.
        let err = axfr_with_response(ResponseOpts {
            rcode: 2,
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, XfrError::ServerError(2)));
    }

    #[tokio::test]
    async fn response_multi_question() {
        let question = Question::new(name_to_labels(TEST_ZONE), RrType::AXFR, RrClass::IN);
        let err = axfr_with_response(ResponseOpts {
            questions: vec![question.clone(), question],
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, XfrError::QuestionCountMismatch(2)));
    }

    #[tokio::test]
    async fn response_empty_answer_rejected() {
        let err = axfr_with_response(ResponseOpts {
            answers: vec![],
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, XfrError::EmptyAnswerSection));
    }

    #[tokio::test]
    async fn response_empty_answer_tolerated_when_configured() {
        // With strictness off, an empty message is skipped and the next
        // one ends the transfer.
        let config = XfrConfig {
            reject_empty_axfr: false,
            ..test_config()
        };
        let (mut conn, mut server) = connection_pair(config);
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await.unwrap();
        let qid = read_query(&mut server).await;
        let empty = build_response(
            qid,
            &ResponseOpts {
                answers: vec![],
                ..Default::default()
            },
        );
        let full = build_response(
            qid,
            &ResponseOpts {
                answers: vec![soa_record(1), soa_record(1)],
                ..Default::default()
            },
        );
        tokio::io::AsyncWriteExt::write_all(&mut server, &[empty, full].concat())
            .await
            .unwrap();

        assert!(stream.next_record().await.unwrap().is_some());
        assert!(stream.next_record().await.unwrap().is_none());
        assert_eq!(stream.serial(), Some(1));
    }

    #[tokio::test]
    async fn response_malformed_body() {
        // 4 octets of garbage behind a valid length prefix.
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await.unwrap();
        let _qid = read_query(&mut server).await;
        tokio::io::AsyncWriteExt::write_all(&mut server, &wire::frame(b"xxxx"))
            .await
            .unwrap();

        let err = stream.next_record().await.unwrap_err();
        assert!(matches!(err, XfrError::MalformedMessage(_)));
    }

    #[tokio::test]
    async fn response_timeout() {
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await.unwrap();
        let _qid = read_query(&mut server).await;
        // never write a response
        let err = stream.next_record().await.unwrap_err();
        assert!(matches!(err, XfrError::Timeout));
    }

    #[tokio::test]
    async fn two_soas_yield_one_record_and_terminate() {
        // A complete minimal transfer: two messages of one SOA each. The
        // second SOA is the end marker and is not yielded.
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await.unwrap();
        let qid = read_query(&mut server).await;
        let first = build_response(qid, &ResponseOpts::default());
        let second = build_response(qid, &ResponseOpts::default());
        tokio::io::AsyncWriteExt::write_all(&mut server, &[first, second].concat())
            .await
            .unwrap();

        let record = stream.next_record().await.unwrap().unwrap();
        assert_eq!(record.rtype, RrType::SOA);
        assert!(stream.next_record().await.unwrap().is_none());
        // exhausted stream stays exhausted
        assert!(stream.next_record().await.unwrap().is_none());
        assert_eq!(stream.serial(), Some(1234));
    }

    #[tokio::test]
    async fn eof_without_terminating_soa() {
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let mut stream = conn.transfer().await.unwrap();
        let qid = read_query(&mut server).await;
        let only = build_response(qid, &ResponseOpts::default());
        tokio::io::AsyncWriteExt::write_all(&mut server, &only)
            .await
            .unwrap();
        drop(server);

        assert!(stream.next_record().await.unwrap().is_some());
        let err = stream.next_record().await.unwrap_err();
        assert!(matches!(err, XfrError::UnexpectedEndOfTransfer));
    }

    #[tokio::test]
    async fn soa_check_ok() {
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let check = tokio::spawn(async move {
            let serial = conn.check_soa_serial().await;
            (conn, serial)
        });
        let qid = read_query(&mut server).await;
        let response = build_response(
            qid,
            &ResponseOpts {
                questions: vec![Question::new(
                    name_to_labels(TEST_ZONE),
                    RrType::SOA,
                    RrClass::IN,
                )],
                ..Default::default()
            },
        );
        tokio::io::AsyncWriteExt::write_all(&mut server, &response)
            .await
            .unwrap();

        let (conn, serial) = check.await.unwrap();
        assert_eq!(serial.unwrap(), 1234);
        assert_eq!(conn.state(), ConnState::SoaChecking);
    }

    #[tokio::test]
    async fn soa_check_bad_qid() {
        let (mut conn, mut server) = connection_pair(test_config());
        conn.connect().await.unwrap();

        let check = tokio::spawn(async move { conn.check_soa_serial().await });
        let qid = read_query(&mut server).await;
        let response = build_response(
            qid,
            &ResponseOpts {
                bad_qid: true,
                ..Default::default()
            },
        );
        tokio::io::AsyncWriteExt::write_all(&mut server, &response)
            .await
            .unwrap();

        assert!(matches!(
            check.await.unwrap(),
            Err(XfrError::QidMismatch { .. })
        ));
    }

    /// Scripted master for full `run()` exchanges: answers the optional
    /// SOA query, then the AXFR, from one task.
    fn spawn_master(mut server: DuplexStream, soa_first: bool, axfr_messages: usize) {
        tokio::spawn(async move {
            if soa_first {
                let qid = read_query(&mut server).await;
                let response = build_response(
                    qid,
                    &ResponseOpts {
                        questions: vec![Question::new(
                            name_to_labels(TEST_ZONE),
                            RrType::SOA,
                            RrClass::IN,
                        )],
                        ..Default::default()
                    },
                );
                tokio::io::AsyncWriteExt::write_all(&mut server, &response)
                    .await
                    .unwrap();
            }

            let qid = read_query(&mut server).await;
            let mut bytes = Vec::new();
            for i in 0..axfr_messages {
                let answers = if axfr_messages == 1 {
                    vec![soa_record(1234), a_record("www.example.com"), soa_record(1234)]
                } else if i == 0 {
                    vec![soa_record(1234), a_record("www.example.com")]
                } else if i == axfr_messages - 1 {
                    vec![a_record("mail.example.com"), soa_record(1234)]
                } else {
                    vec![a_record("ftp.example.com")]
                };
                bytes.extend(build_response(
                    qid,
                    &ResponseOpts {
                        answers,
                        ..Default::default()
                    },
                ));
            }
            tokio::io::AsyncWriteExt::write_all(&mut server, &bytes)
                .await
                .unwrap();
            // keep the connection open until the client is done
            let mut sink = [0u8; 16];
            let _ = server.read(&mut sink).await;
        });
    }

    #[tokio::test]
    async fn run_ok_single_message() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("example.com.db");
        let (mut conn, server) = connection_pair(test_config());
        spawn_master(server, false, 1);

        let mut sink = FileZoneSink::open(TEST_ZONE, &db_file).unwrap();
        let outcome = conn.run(false, &mut sink).await;
        assert_eq!(outcome, TransferOutcome::Ok { records: 2 });
        assert_eq!(conn.state(), ConnState::Done);
        assert!(db_file.exists());
    }

    #[tokio::test]
    async fn run_ok_multi_message() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("example.com.db");
        let (mut conn, server) = connection_pair(test_config());
        spawn_master(server, false, 3);

        let mut sink = FileZoneSink::open(TEST_ZONE, &db_file).unwrap();
        let outcome = conn.run(false, &mut sink).await;
        // first SOA + www + ftp + mail; terminating SOA not counted
        assert_eq!(outcome, TransferOutcome::Ok { records: 4 });
    }

    #[tokio::test]
    async fn run_with_soa_check_ok() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("example.com.db");
        let (mut conn, server) = connection_pair(test_config());
        spawn_master(server, true, 1);

        let mut sink = FileZoneSink::open(TEST_ZONE, &db_file).unwrap();
        let outcome = conn.run(true, &mut sink).await;
        assert_eq!(outcome, TransferOutcome::Ok { records: 2 });
    }

    #[tokio::test]
    async fn run_fail_on_silent_master() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("example.com.db");
        let (mut conn, _server) = connection_pair(test_config());

        let mut sink = FileZoneSink::open(TEST_ZONE, &db_file).unwrap();
        let outcome = conn.run(false, &mut sink).await;
        assert_eq!(outcome, TransferOutcome::Fail);
        assert_eq!(conn.state(), ConnState::Failed);
        assert!(!db_file.exists());
    }

    #[tokio::test]
    async fn run_fail_on_connect_error() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("example.com.db");
        let config = test_config();
        let mut conn = TransferConnection::new(
            TEST_ZONE,
            RrClass::IN,
            "127.0.0.1:53".parse().unwrap(),
            Arc::new(RefusingFactory),
            &config,
        );

        let mut sink = FileZoneSink::open(TEST_ZONE, &db_file).unwrap();
        assert_eq!(conn.run(false, &mut sink).await, TransferOutcome::Fail);
    }

    #[tokio::test]
    async fn run_fail_on_store_error() {
        // sink that refuses every write
        struct FailingSink;
        impl ZoneSink for FailingSink {
            fn add_record(&mut self, _record: &Record) -> Result<()> {
                Err(XfrError::StoreWriteError("disk full".to_string()))
            }
            fn commit(&mut self, _serial: u32) -> Result<()> {
                Err(XfrError::StoreWriteError("disk full".to_string()))
            }
        }

        let (mut conn, server) = connection_pair(test_config());
        spawn_master(server, false, 1);

        let mut sink = FailingSink;
        assert_eq!(conn.run(false, &mut sink).await, TransferOutcome::Fail);
    }
}
