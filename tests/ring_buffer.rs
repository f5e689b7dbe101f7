mod tests {
    use serial_light_control::RingBuffer;

    #[test]
    fn test_fifo_order() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        buffer.put_many(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(buffer.len(), 7);
        for expected in 1..=7 {
            assert_eq!(buffer.pop(), Some(expected));
        }
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_capacity_reserves_one_slot() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        for byte in 0..20 {
            buffer.put(byte);
        }
        assert_eq!(buffer.capacity(), 7);
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn test_drop_on_full_keeps_contents() {
        let mut buffer: RingBuffer<4> = RingBuffer::new();
        buffer.put_many(&[10, 20, 30]);
        buffer.put(40);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.pop(), Some(10));
        assert_eq!(buffer.pop(), Some(20));
        assert_eq!(buffer.pop(), Some(30));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_put_many_truncates_silently() {
        let mut buffer: RingBuffer<4> = RingBuffer::new();
        buffer.put_many(&[1, 2, 3, 4, 5]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.peek_at(2), 3);
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let mut buffer: RingBuffer<4> = RingBuffer::new();
        for round in 0..10u8 {
            buffer.put(round);
            buffer.put(round + 100);
            assert_eq!(buffer.pop(), Some(round));
            assert_eq!(buffer.pop(), Some(round + 100));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        assert_eq!(buffer.peek(), 0);
        buffer.put(42);
        assert_eq!(buffer.peek(), 42);
        assert_eq!(buffer.peek(), 42);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_peek_at_out_of_range_is_zero() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        buffer.put_many(&[1, 2]);
        assert_eq!(buffer.peek_at(0), 1);
        assert_eq!(buffer.peek_at(1), 2);
        assert_eq!(buffer.peek_at(2), 0);
        assert_eq!(buffer.peek_at(100), 0);
    }

    #[test]
    fn test_copy_out_zero_fills_past_stored() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        buffer.put_many(&[7, 8]);
        let mut dest = [0xFF; 4];
        buffer.copy_out(&mut dest);
        assert_eq!(dest, [7, 8, 0, 0]);
        // copy_out never consumes
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_pop_many_clamps_at_empty() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        buffer.put_many(&[1, 2, 3]);
        buffer.pop_many(10);
        assert!(buffer.is_empty());
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_put_str() {
        let mut buffer: RingBuffer<16> = RingBuffer::new();
        buffer.put_str("ok\r\n");
        assert_eq!(buffer.pop(), Some(b'o'));
        assert_eq!(buffer.pop(), Some(b'k'));
        assert_eq!(buffer.pop(), Some(b'\r'));
        assert_eq!(buffer.pop(), Some(b'\n'));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut buffer: RingBuffer<8> = RingBuffer::new();
        buffer.put_many(&[1, 2, 3]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.peek(), 0);
        buffer.put(9);
        assert_eq!(buffer.pop(), Some(9));
    }
}
