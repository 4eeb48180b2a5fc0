use std::io::{Cursor, Read};

use arbcti_codec::Fields;
use arbcti_frame::{FrameConfig, MessageReader};
use arbcti_msg::{Direction, MessageKind};
use proptest::prelude::*;

/// Delivers the wire bytes in caller-chosen chunk sizes.
struct Chunked {
    data: Cursor<Vec<u8>>,
    sizes: Vec<usize>,
    next: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.sizes[self.next % self.sizes.len()];
        self.next += 1;
        let limit = size.min(buf.len());
        self.data.read(&mut buf[..limit])
    }
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_matter(
        sizes in proptest::collection::vec(1usize..64, 1..16),
        buffer_size in 1usize..256,
        kinds in proptest::collection::vec(0usize..MessageKind::ALL.len(), 1..5),
    ) {
        let messages: Vec<Vec<u8>> = kinds
            .iter()
            .map(|i| {
                MessageKind::ALL[*i]
                    .pack(Direction::Client, &Fields::new())
                    .unwrap()
                    .to_vec()
            })
            .collect();
        let wire: Vec<u8> = messages.concat();

        let source = Chunked { data: Cursor::new(wire), sizes, next: 0 };
        let config = FrameConfig { buffer_size, ..FrameConfig::default() };
        let mut reader = MessageReader::with_config(source, config);

        for expected in &messages {
            let msg = reader.read_message().unwrap();
            prop_assert_eq!(msg.as_ref(), expected.as_slice());
        }
        prop_assert_eq!(reader.buffered(), 0);
    }
}
