//! Exercises the exported C functions the way a C caller would.

use bottom::ffi::{
    bottom_decode_alloc, bottom_decode_buf, bottom_encode_alloc,
    bottom_encode_buf, bottom_free_slice, bottom_get_error,
    bottom_get_error_string, bottom_get_version, bottom_init_lib,
    BottomSlice, BOTTOM_MAX_EXPANSION_SIZE_PER_BYTE, VERSION,
};
use bottom::ErrorCode;

use std::thread;

const HELLO: &[u8] = b"Hello, world!";

fn error() -> ErrorCode {
    ErrorCode::from_u8(bottom_get_error()).expect("known error code")
}

fn encode_alloc(input: &[u8]) -> BottomSlice {
    unsafe { bottom_encode_alloc(input.as_ptr(), input.len()) }
}

fn decode_alloc(input: &[u8]) -> BottomSlice {
    unsafe { bottom_decode_alloc(input.as_ptr(), input.len()) }
}

fn bytes(slice: &BottomSlice) -> Vec<u8> {
    unsafe { slice.as_bytes() }.to_vec()
}

#[test]
fn hello_world_round_trip() {
    bottom_init_lib();
    let encoded = encode_alloc(HELLO);
    assert!(!encoded.is_null());
    assert_eq!(error(), ErrorCode::NoError);

    let decoded = decode_alloc(&bytes(&encoded));
    assert_eq!(error(), ErrorCode::NoError);
    assert_eq!(decoded.size, HELLO.len());
    assert_eq!(bytes(&decoded), HELLO);

    unsafe {
        bottom_free_slice(encoded);
        bottom_free_slice(decoded);
    }
}

#[test]
fn decoding_plain_text_fails() {
    let decoded = decode_alloc(HELLO);
    assert_eq!(decoded, BottomSlice::empty());
    assert_eq!(error(), ErrorCode::InvalidInput);
    // Reading again doesn't clear the register.
    assert_eq!(error(), ErrorCode::InvalidInput);
    assert_eq!(error(), ErrorCode::InvalidInput);
}

#[test]
fn success_clears_error() {
    decode_alloc(b"\x01\x02");
    assert_eq!(error(), ErrorCode::InvalidInput);
    let encoded = encode_alloc(b"x");
    assert_eq!(error(), ErrorCode::NoError);
    unsafe { bottom_free_slice(encoded) };
}

#[test]
fn any_successful_call_clears_error() {
    let fail = || {
        decode_alloc(HELLO);
        assert_eq!(error(), ErrorCode::InvalidInput);
        assert_eq!(error(), ErrorCode::InvalidInput);
    };

    fail();
    let message = bottom_get_error_string(ErrorCode::InvalidInput.into());
    assert_eq!(bytes(&message), ErrorCode::InvalidInput.message().as_bytes());
    assert_eq!(error(), ErrorCode::NoError);

    fail();
    bottom_get_version();
    assert_eq!(error(), ErrorCode::NoError);

    fail();
    unsafe { bottom_free_slice(BottomSlice::empty()) };
    assert_eq!(error(), ErrorCode::NoError);

    fail();
    bottom_init_lib();
    assert_eq!(error(), ErrorCode::NoError);
}

#[test]
fn empty_input() {
    let encoded = encode_alloc(&[]);
    assert!(encoded.is_null());
    assert_eq!(error(), ErrorCode::NoError);

    let decoded = unsafe { bottom_decode_alloc(std::ptr::null(), 0) };
    assert!(decoded.is_null());
    assert_eq!(error(), ErrorCode::NoError);

    let mut buf = [0; 4];
    let written =
        unsafe { bottom_encode_buf(std::ptr::null(), 0, buf.as_mut_ptr(), 4) };
    assert_eq!(written.data, buf.as_mut_ptr());
    assert_eq!(written.size, 0);
}

#[test]
fn null_input_with_length_is_invalid() {
    let encoded = unsafe { bottom_encode_alloc(std::ptr::null(), 3) };
    assert!(encoded.is_null());
    assert_eq!(error(), ErrorCode::InvalidInput);
}

#[test]
fn buf_matches_alloc() {
    let input: Vec<u8> = (0..=255).collect();
    let alloc = encode_alloc(&input);
    let mut buf = vec![0; input.len() * BOTTOM_MAX_EXPANSION_SIZE_PER_BYTE];
    let written = unsafe {
        bottom_encode_buf(
            input.as_ptr(),
            input.len(),
            buf.as_mut_ptr(),
            buf.len(),
        )
    };
    assert_eq!(error(), ErrorCode::NoError);
    assert_eq!(written.data, buf.as_mut_ptr());
    assert_eq!(written.size, alloc.size);
    assert_eq!(bytes(&written), bytes(&alloc));
    unsafe { bottom_free_slice(alloc) };
}

#[test]
fn encode_buf_too_small() {
    let needed = encode_alloc(HELLO);
    let mut buf = vec![0xee; needed.size - 1];
    let written = unsafe {
        bottom_encode_buf(
            HELLO.as_ptr(),
            HELLO.len(),
            buf.as_mut_ptr(),
            buf.len(),
        )
    };
    assert_eq!(written, BottomSlice::empty());
    assert_eq!(error(), ErrorCode::BufferTooSmall);
    assert!(buf.iter().all(|&b| b == 0xee));
    unsafe { bottom_free_slice(needed) };
}

#[test]
fn decode_buf() {
    let encoded = encode_alloc(HELLO);
    let data = bytes(&encoded);
    unsafe { bottom_free_slice(encoded) };

    let mut small = [0; 4];
    let written = unsafe {
        bottom_decode_buf(data.as_ptr(), data.len(), small.as_mut_ptr(), 4)
    };
    assert!(written.is_null());
    assert_eq!(error(), ErrorCode::BufferTooSmall);
    assert_eq!(small, [0; 4]);

    let mut buf = [0; 32];
    let written = unsafe {
        bottom_decode_buf(data.as_ptr(), data.len(), buf.as_mut_ptr(), 32)
    };
    assert_eq!(error(), ErrorCode::NoError);
    assert_eq!(written.data, buf.as_mut_ptr());
    assert_eq!(bytes(&written), HELLO);

    let written = unsafe {
        bottom_decode_buf(HELLO.as_ptr(), HELLO.len(), buf.as_mut_ptr(), 32)
    };
    assert!(written.is_null());
    assert_eq!(error(), ErrorCode::InvalidInput);
}

#[test]
fn error_strings() {
    for code in 0..=u8::MAX {
        let message = bottom_get_error_string(code);
        assert!(!message.is_null());
        assert!(message.size > 0);
    }
    let message = bottom_get_error_string(ErrorCode::InvalidInput.into());
    assert_eq!(
        bytes(&message),
        ErrorCode::InvalidInput.message().as_bytes(),
    );
    assert_eq!(bytes(&bottom_get_error_string(99)), b"unknown error");
}

#[test]
fn version_is_static() {
    let version = bottom_get_version();
    assert_eq!(bytes(&version), VERSION.as_bytes());
    assert!(VERSION.starts_with("bottom "));
    // Freeing static slices is ignored.
    unsafe {
        bottom_free_slice(version);
        for code in [0, 1, 2, 3, 200] {
            bottom_free_slice(bottom_get_error_string(code));
        }
        bottom_free_slice(BottomSlice::empty());
    }
    assert_eq!(bytes(&bottom_get_version()), VERSION.as_bytes());
    assert_eq!(bytes(&bottom_get_error_string(200)), b"unknown error");
}

#[test]
fn init_is_idempotent() {
    bottom_init_lib();
    bottom_init_lib();
    assert_eq!(bytes(&bottom_get_version()), VERSION.as_bytes());
}

#[cfg(debug_assertions)]
#[test]
fn misuse_of_free_is_ignored_in_debug_builds() {
    let mut buf = [0; 64];
    let written = unsafe {
        bottom_encode_buf(b"a".as_ptr(), 1, buf.as_mut_ptr(), buf.len())
    };
    assert!(!written.is_null());
    unsafe { bottom_free_slice(written) };

    // A size no other test produces, so a concurrent allocation can't be
    // mistaken for this one after the first free.
    let owned = encode_alloc(&[199; 50]);
    unsafe {
        bottom_free_slice(owned);
        bottom_free_slice(owned);
    }
}

#[test]
fn error_register_is_per_thread() {
    decode_alloc(HELLO);
    assert_eq!(error(), ErrorCode::InvalidInput);
    let seen = thread::spawn(|| {
        let seen = error();
        let encoded = encode_alloc(b"thread");
        unsafe { bottom_free_slice(encoded) };
        seen
    })
    .join()
    .unwrap();
    assert_eq!(seen, ErrorCode::NoError);
    assert_eq!(error(), ErrorCode::InvalidInput);
}
