//! Shared helpers for integration tests: record builders and a scripted
//! AXFR master served over real TCP.
#![allow(dead_code)]

use std::net::SocketAddr;

use muninn::dns::{
    Message,
    enums::{RrClass, RrType},
    header::Header,
    name_to_labels,
    question::Question,
    record::Record,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn soa_record(zone: &str, serial: u32) -> Record {
    let mut rdata = Vec::new();
    rdata.extend_from_slice(b"\x06master\x07example\x03com\x00");
    rdata.extend_from_slice(b"\x05admin\x07example\x03com\x00");
    rdata.extend_from_slice(&serial.to_be_bytes());
    rdata.extend_from_slice(&3600u32.to_be_bytes());
    rdata.extend_from_slice(&1800u32.to_be_bytes());
    rdata.extend_from_slice(&2419200u32.to_be_bytes());
    rdata.extend_from_slice(&7200u32.to_be_bytes());
    Record {
        labels: name_to_labels(zone),
        rtype: RrType::SOA,
        rclass: RrClass::IN,
        ttl: 3600,
        rdata,
    }
}

pub fn a_record(name: &str, last_octet: u8) -> Record {
    Record {
        labels: name_to_labels(name),
        rtype: RrType::A,
        rclass: RrClass::IN,
        ttl: 300,
        rdata: vec![192, 0, 2, last_octet],
    }
}

/// Frame a response message echoing the given question with the given
/// answers.
pub fn build_response(qid: u16, question: &Question, answers: Vec<Record>) -> Vec<u8> {
    let message = Message {
        header: Header {
            id: qid,
            qr: true,
            qdcount: 1,
            ancount: answers.len() as u16,
            ..Default::default()
        },
        questions: vec![question.clone()],
        answers,
        ..Default::default()
    };
    let payload = message.serialize().expect("serialize response");
    let mut framed = Vec::with_capacity(payload.len() + 2);
    framed.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    framed.extend_from_slice(&payload);
    framed
}

/// Read one framed query off the stream.
pub async fn read_query(stream: &mut TcpStream) -> Message {
    let mut prefix = [0u8; 2];
    stream.read_exact(&mut prefix).await.expect("query prefix");
    let len = u16::from_be_bytes(prefix) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.expect("query payload");
    Message::parse(&payload).expect("parse query")
}

/// What the scripted master does once a client connects and queries.
pub enum MasterScript {
    /// Serve a well-formed AXFR split into the given answer batches.
    Axfr(Vec<Vec<Record>>),
    /// Send a framed blob of garbage instead of a DNS message.
    Garbage(Vec<u8>),
    /// Accept the connection and never respond.
    Silent,
}

/// Bind a one-shot master on the loopback and return its address.
pub async fn spawn_master(script: MasterScript) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind master");
    let addr = listener.local_addr().expect("master addr");

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        match script {
            MasterScript::Silent => {
                // hold the socket open so the client times out on read
                let mut buf = [0u8; 512];
                while stream.read(&mut buf).await.map(|n| n > 0).unwrap_or(false) {}
            }
            MasterScript::Garbage(blob) => {
                let query = read_query(&mut stream).await;
                assert!(!query.header.qr);
                let mut framed = Vec::with_capacity(blob.len() + 2);
                framed.extend_from_slice(&(blob.len() as u16).to_be_bytes());
                framed.extend_from_slice(&blob);
                stream.write_all(&framed).await.expect("write garbage");
                // let the client read before the socket goes away
                let _ = stream.read(&mut [0u8; 16]).await;
            }
            MasterScript::Axfr(batches) => {
                let query = read_query(&mut stream).await;
                let qid = query.header.id;
                let question = query.questions[0].clone();
                let mut bytes = Vec::new();
                for answers in batches {
                    bytes.extend(build_response(qid, &question, answers));
                }
                stream.write_all(&bytes).await.expect("write axfr");
                let _ = stream.read(&mut [0u8; 16]).await;
            }
        }
    });

    addr
}
