//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Integration tests driving a built interpreter through wire exchanges

use mudwire_engine::{
    CharsetPlugin, EchoPlugin, GmcpMessage, GmcpPlugin, InterpreterBuilder, MccpPlugin,
    MsdpPlugin, MsdpValue, MsspConfig, MsspPlugin, NawsPlugin, TelnetError, TelnetInterpreter,
    TelnetMode, TelnetOption, consts,
};
use std::sync::{Arc, Mutex};
use tracing_test::traced_test;

// ============================================================================
// Helpers
// ============================================================================

type Wire = Arc<Mutex<Vec<u8>>>;

/// Adds a negotiation recorder to a builder, returning the capture buffer.
fn record_wire(builder: InterpreterBuilder) -> (InterpreterBuilder, Wire) {
    let wire: Wire = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&wire);
    let builder = builder.on_negotiation(move |bytes| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().extend_from_slice(&bytes);
        }
    });
    (builder, wire)
}

fn taken(wire: &Wire) -> Vec<u8> {
    std::mem::take(&mut *wire.lock().unwrap())
}

// ============================================================================
// ECHO negotiation
// ============================================================================

#[tokio::test]
async fn client_answers_will_echo_with_do_and_reports_state() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let events: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let interpreter = builder
        .plugin(EchoPlugin::new())
        .on_echo_state_changed(move |enabled| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(enabled);
            }
        })
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert!(taken(&wire).is_empty(), "a client makes no startup offers");

    interpreter
        .interpret(&[consts::IAC, consts::WILL, consts::option::ECHO])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::DO, consts::option::ECHO]
    );
    assert_eq!(*events.lock().unwrap(), vec![true]);
    assert!(interpreter.is_enabled_remote(TelnetOption::Echo));
    assert!(
        interpreter
            .with_plugin(|echo: &EchoPlugin| echo.is_remote_echoing())
            .unwrap()
    );

    interpreter
        .interpret(&[consts::IAC, consts::WONT, consts::option::ECHO])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert!(taken(&wire).is_empty(), "WONT is not acknowledged");
    assert_eq!(*events.lock().unwrap(), vec![true, false]);
    assert!(!interpreter.is_enabled_remote(TelnetOption::Echo));
}

#[tokio::test]
async fn server_accepts_do_echo_silently() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let events: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let interpreter = builder
        .plugin(EchoPlugin::new())
        .on_echo_state_changed(move |enabled| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(enabled);
            }
        })
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::WILL, consts::option::ECHO],
        "the server offers WILL ECHO at startup"
    );

    interpreter
        .interpret(&[consts::IAC, consts::DO, consts::option::ECHO])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert!(taken(&wire).is_empty(), "the DO completes the offer silently");
    assert_eq!(*events.lock().unwrap(), vec![true]);
    assert!(interpreter.is_enabled_local(TelnetOption::Echo));
}

#[tokio::test]
async fn server_echo_handler_echoes_application_bytes() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let interpreter = builder
        .plugin(EchoPlugin::new().with_server_echo(true))
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    taken(&wire);

    interpreter
        .interpret(&[consts::IAC, consts::DO, consts::option::ECHO])
        .await
        .unwrap();
    interpreter.interpret(b"hi").await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(taken(&wire), b"hi".to_vec());
}

// ============================================================================
// NAWS
// ============================================================================

#[tokio::test]
async fn client_replies_will_naws_and_reports_window() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let interpreter = builder
        .plugin(NawsPlugin::new().with_window_size(100, 40))
        .build()
        .unwrap();
    interpreter
        .interpret(&[consts::IAC, consts::DO, consts::option::NAWS])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![
            consts::IAC,
            consts::WILL,
            consts::option::NAWS,
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x64,
            0x00,
            0x28,
            consts::IAC,
            consts::SE,
        ]
    );
}

#[tokio::test]
async fn server_decodes_window_size_report() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let sizes: Arc<Mutex<Vec<(u16, u16)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sizes);
    let interpreter = builder
        .plugin(NawsPlugin::new())
        .on_naws(move |width, height| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((width, height));
            }
        })
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::DO, consts::option::NAWS],
        "the server announces DO NAWS at startup"
    );

    interpreter
        .interpret(&[
            consts::IAC,
            consts::WILL,
            consts::option::NAWS,
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x64,
            0x00,
            0x28,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(*sizes.lock().unwrap(), vec![(100, 40)]);
    let last = interpreter
        .with_plugin(|naws: &NawsPlugin| naws.last_received())
        .unwrap()
        .unwrap();
    assert_eq!((last.cols, last.rows), (100, 40));
}

#[tokio::test]
async fn send_naws_escapes_iac_dimensions() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let interpreter = builder.plugin(NawsPlugin::new()).build().unwrap();
    interpreter.send_naws(0xFFFF, 24).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0xFF,
            0xFF, // escaped width high byte
            0xFF,
            0xFF, // escaped width low byte
            0x00,
            0x18,
            consts::IAC,
            consts::SE,
        ]
    );
}

// ============================================================================
// CHARSET
// ============================================================================

async fn charset_fixture(
    preferred: &[&str],
) -> (TelnetInterpreter, Wire, Arc<Mutex<Vec<String>>>) {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let changes: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    let interpreter = builder
        .plugin(CharsetPlugin::new(preferred.iter().copied()))
        .on_charset_changed(move |encoding| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(encoding);
            }
        })
        .build()
        .unwrap();
    (interpreter, wire, changes)
}

#[tokio::test]
async fn charset_request_picks_earliest_preference() {
    let (interpreter, wire, changes) = charset_fixture(&["UTF-8", "ISO-8859-1"]).await;
    assert_eq!(interpreter.current_encoding(), "US-ASCII");

    let mut request = vec![
        consts::IAC,
        consts::SB,
        consts::option::CHARSET,
        consts::option::charset::REQUEST,
    ];
    request.extend_from_slice(b";UTF-16;UTF-8;ISO-8859-1");
    request.extend_from_slice(&[consts::IAC, consts::SE]);
    interpreter.interpret(&request).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();

    let mut expected = vec![
        consts::IAC,
        consts::SB,
        consts::option::CHARSET,
        consts::option::charset::ACCEPTED,
    ];
    expected.extend_from_slice(b"UTF-8");
    expected.extend_from_slice(&[consts::IAC, consts::SE]);
    assert_eq!(taken(&wire), expected);
    assert_eq!(interpreter.current_encoding(), "UTF-8");
    assert_eq!(*changes.lock().unwrap(), vec!["UTF-8".to_string()]);
}

#[tokio::test]
async fn charset_request_without_match_is_rejected() {
    let (interpreter, wire, changes) = charset_fixture(&["KOI8-R"]).await;
    let mut request = vec![
        consts::IAC,
        consts::SB,
        consts::option::CHARSET,
        consts::option::charset::REQUEST,
    ];
    request.extend_from_slice(b";UTF-16;UTF-8");
    request.extend_from_slice(&[consts::IAC, consts::SE]);
    interpreter.interpret(&request).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![
            consts::IAC,
            consts::SB,
            consts::option::CHARSET,
            consts::option::charset::REJECTED,
            consts::IAC,
            consts::SE,
        ]
    );
    assert_eq!(interpreter.current_encoding(), "US-ASCII");
    assert!(changes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn charset_accepted_switches_encoding() {
    let (interpreter, _wire, changes) = charset_fixture(&["UTF-8"]).await;
    let mut accepted = vec![
        consts::IAC,
        consts::SB,
        consts::option::CHARSET,
        consts::option::charset::ACCEPTED,
    ];
    accepted.extend_from_slice(b"UTF-8");
    accepted.extend_from_slice(&[consts::IAC, consts::SE]);
    interpreter.interpret(&accepted).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(interpreter.current_encoding(), "UTF-8");
    assert_eq!(*changes.lock().unwrap(), vec!["UTF-8".to_string()]);
}

// ============================================================================
// GMCP
// ============================================================================

#[tokio::test]
async fn gmcp_send_and_receive_round_trip() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let messages: Arc<Mutex<Vec<GmcpMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let interpreter = builder
        .plugin(GmcpPlugin::new())
        .on_gmcp(move |message| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(message);
            }
        })
        .build()
        .unwrap();

    interpreter
        .send_gmcp("Core.Hello", "{\"v\":1}")
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    let mut expected = vec![consts::IAC, consts::SB, consts::option::GMCP];
    expected.extend_from_slice(b"Core.Hello {\"v\":1}");
    expected.extend_from_slice(&[consts::IAC, consts::SE]);
    let emitted = taken(&wire);
    assert_eq!(emitted, expected);

    // The same bytes fed back decode to the same message.
    interpreter.interpret(&emitted).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        *messages.lock().unwrap(),
        vec![GmcpMessage::new("Core.Hello", "{\"v\":1}")]
    );
}

// ============================================================================
// MSSP
// ============================================================================

#[tokio::test]
async fn server_serializes_status_on_agreement() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let interpreter = builder
        .plugin(MsspPlugin::new().with_provider(|| {
            let mut config = MsspConfig::new();
            config.set("NAME", "Moonbase");
            config.set("PLAYERS", 3i64);
            config
        }))
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::WILL, consts::option::MSSP]
    );

    interpreter
        .interpret(&[consts::IAC, consts::DO, consts::option::MSSP])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    let mut expected = vec![consts::IAC, consts::SB, consts::option::MSSP];
    expected.push(consts::option::mssp::VAR);
    expected.extend_from_slice(b"NAME");
    expected.push(consts::option::mssp::VAL);
    expected.extend_from_slice(b"Moonbase");
    expected.push(consts::option::mssp::VAR);
    expected.extend_from_slice(b"PLAYERS");
    expected.push(consts::option::mssp::VAL);
    expected.extend_from_slice(b"3");
    expected.extend_from_slice(&[consts::IAC, consts::SE]);
    assert_eq!(taken(&wire), expected);
}

#[tokio::test]
async fn client_decodes_status_table() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let tables: Arc<Mutex<Vec<MsspConfig>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&tables);
    let interpreter = builder
        .plugin(MsspPlugin::new())
        .on_mssp(move |config| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(config);
            }
        })
        .build()
        .unwrap();
    let mut payload = vec![consts::IAC, consts::SB, consts::option::MSSP];
    payload.push(consts::option::mssp::VAR);
    payload.extend_from_slice(b"NAME");
    payload.push(consts::option::mssp::VAL);
    payload.extend_from_slice(b"Moonbase");
    payload.extend_from_slice(&[consts::IAC, consts::SE]);
    interpreter.interpret(&payload).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    let tables = tables.lock().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(
        tables[0].get("NAME"),
        Some(&mudwire_engine::MsspValue::String("Moonbase".into()))
    );
}

// ============================================================================
// MSDP
// ============================================================================

#[tokio::test]
async fn msdp_subnegotiation_decodes_to_table() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let tables: Arc<Mutex<Vec<mudwire_engine::MsdpTable>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&tables);
    let interpreter = builder
        .plugin(MsdpPlugin::new())
        .on_msdp(move |table| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(table);
            }
        })
        .build()
        .unwrap();
    let mut payload = vec![consts::IAC, consts::SB, consts::option::MSDP];
    payload.push(consts::option::msdp::VAR);
    payload.extend_from_slice(b"LIST");
    payload.push(consts::option::msdp::VAL);
    payload.extend_from_slice(b"COMMANDS");
    payload.extend_from_slice(&[consts::IAC, consts::SE]);
    interpreter.interpret(&payload).await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    let tables = tables.lock().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].get("LIST"), Some(&MsdpValue::string("COMMANDS")));
}

// ============================================================================
// MCCP negotiation
// ============================================================================

#[tokio::test]
async fn server_offers_v3_first_and_falls_back_to_v2() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let interpreter = builder
        .plugin(MccpPlugin::new().with_v3(true))
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::WILL, consts::option::COMPRESS3]
    );

    interpreter
        .interpret(&[consts::IAC, consts::DONT, consts::option::COMPRESS3])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::WILL, consts::option::COMPRESS2]
    );
}

#[tokio::test]
async fn server_emits_v2_marker_on_agreement() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let events: Arc<Mutex<Vec<(mudwire_engine::CompressVersion, bool)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let interpreter = builder
        .plugin(MccpPlugin::new())
        .on_compression_enabled(move |version, enabled| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((version, enabled));
            }
        })
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::WILL, consts::option::COMPRESS2]
    );

    interpreter
        .interpret(&[consts::IAC, consts::DO, consts::option::COMPRESS2])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![
            consts::IAC,
            consts::SB,
            consts::option::COMPRESS2,
            consts::IAC,
            consts::SE,
        ]
    );
    assert_eq!(
        *events.lock().unwrap(),
        vec![(mudwire_engine::CompressVersion::V2, true)]
    );
}

// ============================================================================
// Application data channel
// ============================================================================

#[tokio::test]
async fn lines_are_submitted_with_current_encoding() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let lines: Arc<Mutex<Vec<(Vec<u8>, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let interpreter = builder
        .on_submit(move |line, encoding| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((line.to_vec(), encoding));
            }
        })
        .build()
        .unwrap();
    interpreter.interpret(b"look\r\nnorth\r\n").await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        *lines.lock().unwrap(),
        vec![
            (b"look".to_vec(), "US-ASCII".to_string()),
            (b"north".to_vec(), "US-ASCII".to_string()),
        ]
    );
}

#[tokio::test]
async fn escaped_iac_reaches_the_byte_observer_once() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let interpreter = builder
        .on_byte(move |byte, _encoding| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(byte);
            }
        })
        .build()
        .unwrap();
    interpreter
        .interpret(&[b'a', consts::IAC, consts::IAC, b'b'])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![b'a', 0xFF, b'b']);
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn unknown_options_are_refused_automatically() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let interpreter = builder.build().unwrap();
    interpreter
        .interpret(&[consts::IAC, consts::WILL, 99, consts::IAC, consts::DO, 99])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(
        taken(&wire),
        vec![consts::IAC, consts::DONT, 99, consts::IAC, consts::WONT, 99]
    );
}

#[tokio::test]
async fn malformed_subnegotiation_drops_without_killing_session() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let sizes: Arc<Mutex<Vec<(u16, u16)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&sizes);
    let interpreter = builder
        .plugin(NawsPlugin::new())
        .on_naws(move |width, height| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((width, height));
            }
        })
        .build()
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    taken(&wire);

    // Three-byte NAWS payload: dropped, session continues.
    interpreter
        .interpret(&[
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x50,
            0x00,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();
    interpreter
        .interpret(&[
            consts::IAC,
            consts::SB,
            consts::option::NAWS,
            0x00,
            0x50,
            0x00,
            0x18,
            consts::IAC,
            consts::SE,
        ])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(*sizes.lock().unwrap(), vec![(80, 24)]);
}

#[traced_test]
#[tokio::test]
async fn stray_se_is_logged_and_ignored() {
    let (builder, wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let interpreter = builder
        .on_byte(move |byte, _encoding| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(byte);
            }
        })
        .build()
        .unwrap();
    interpreter
        .interpret(&[consts::IAC, consts::SE, b'x'])
        .await
        .unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert!(taken(&wire).is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![b'x']);
    assert!(logs_contain("SE outside subnegotiation"));
}

#[tokio::test]
async fn panicking_callback_does_not_stop_the_worker() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Server));
    let lines: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let interpreter = builder
        .on_submit(move |line, _encoding| {
            let sink = Arc::clone(&sink);
            async move {
                if line.as_ref() == b"boom" {
                    panic!("handler exploded");
                }
                sink.lock().unwrap().push(line.to_vec());
            }
        })
        .build()
        .unwrap();
    interpreter.interpret(b"boom\r\nok\r\n").await.unwrap();
    interpreter.wait_for_processing().await.unwrap();
    assert_eq!(*lines.lock().unwrap(), vec![b"ok".to_vec()]);
}

#[tokio::test]
async fn inputs_after_dispose_are_rejected() {
    let (builder, _wire) = record_wire(TelnetInterpreter::builder(TelnetMode::Client));
    let interpreter = builder.build().unwrap();
    interpreter.interpret(b"before").await.unwrap();
    interpreter.dispose().await.unwrap();
    assert!(matches!(
        interpreter.interpret(b"after").await,
        Err(TelnetError::Disposed)
    ));
    assert!(matches!(
        interpreter.send_gmcp("Core.Ping", "").await,
        Err(TelnetError::Disposed)
    ));
}

// ============================================================================
// Builder validation
// ============================================================================

#[tokio::test]
async fn duplicate_plugins_fail_the_build() {
    let result = TelnetInterpreter::builder(TelnetMode::Server)
        .plugin(EchoPlugin::new())
        .plugin(EchoPlugin::new())
        .build();
    assert!(matches!(
        result,
        Err(TelnetError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn zero_queue_capacity_fails_the_build() {
    let result = TelnetInterpreter::builder(TelnetMode::Server)
        .queue_capacity(0)
        .build();
    assert!(matches!(
        result,
        Err(TelnetError::InvalidConfiguration(_))
    ));
}
