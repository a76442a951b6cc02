use cartbuf_container::{
    Device, DeviceBuffer, ErrorKind, HostBuffer, MemoryKind, Pitch, PitchedRegion, Size,
};

/// Accelerator-space region over plain memory with a caller-chosen pitch.
struct RawDeviceRegion {
    data: Vec<u32>,
    size: Size<2>,
    pitch: Pitch<2>,
}

unsafe impl PitchedRegion<u32, 2> for RawDeviceRegion {
    type Space = Device;

    fn size(&self) -> Size<2> {
        self.size
    }

    fn pitch(&self) -> Pitch<2> {
        self.pitch
    }

    fn data_ptr(&self) -> *const u32 {
        self.data.as_ptr()
    }
}

fn random_f32(len: usize) -> Vec<f32> {
    (0..len).map(|_| fastrand::f32() * 100.0 - 50.0).collect()
}

#[test]
fn test_size_mismatch_leaves_destination_unchanged() {
    fastrand::seed(41);
    let src = DeviceBuffer::<f32, 3>::new(Size::new([4, 4, 4])).unwrap();

    let original = random_f32(32);
    let mut dst = HostBuffer::<f32, 3>::from_slice(Size::new([4, 4, 2]), &original).unwrap();
    let alias = dst.clone();

    let e = dst.assign_from_accelerator(&src).unwrap_err();
    assert!(e.is_invalid_arg());
    assert_eq!(
        e.to_string(),
        "invalid argument rhs: sizes of buffers do not match: (4, 4, 2) <-> (4, 4, 4)"
    );

    let after = dst.to_vec();
    assert_eq!(
        after.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        original.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
    assert_eq!(dst.size(), Size::new([4, 4, 2]));
    assert!(dst.shares_memory_with(&alias));
    assert_eq!(dst.ref_count(), 2);
}

#[test]
fn test_assign_from_accelerator_copies_elements() {
    fastrand::seed(1234);
    let data = random_f32(64);
    let staging = HostBuffer::<f32, 2>::from_slice(Size::new([8, 8]), &data).unwrap();
    let mut src = DeviceBuffer::<f32, 2>::new(Size::new([8, 8])).unwrap();
    src.assign_from_host(&staging).unwrap();

    let mut dst = HostBuffer::<f32, 2>::new(Size::new([8, 8])).unwrap();
    let dst_ptr = dst.data_ptr();
    let dst_pitch = dst.pitch();
    dst.assign_from_accelerator(&src).unwrap();

    assert_eq!(dst.data_ptr(), dst_ptr);
    assert_eq!(dst.pitch(), dst_pitch);
    assert_eq!(dst.memory_kind(), MemoryKind::Host);
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(dst.get([x, y]), Some(data[y * 8 + x]));
        }
    }
}

#[test]
fn test_padded_device_pitch_to_tight_host_pitch() {
    let size = Size::new([3, 5]);
    let mut src = DeviceBuffer::<u32, 2>::new(size).unwrap();
    assert_eq!(src.pitch(), Pitch::<2>::new(256));
    src.assign(0xdead_beef).unwrap();

    let mut dst = HostBuffer::<u32, 2>::new(size).unwrap();
    assert_eq!(dst.pitch(), Pitch::<2>::new(12));
    dst.assign_from_accelerator(&src).unwrap();
    assert_eq!(dst.to_vec(), vec![0xdead_beef; 15]);
}

#[test]
fn test_transfer_visible_through_aliases() {
    let mut src = DeviceBuffer::<u8, 1>::new(Size::new([16])).unwrap();
    src.assign(3).unwrap();

    let mut dst = HostBuffer::<u8, 1>::new(Size::new([16])).unwrap();
    let alias = dst.clone();
    dst.assign_from_accelerator(&src)
        .unwrap()
        .set([0], 9)
        .unwrap();

    let mut expected = vec![3u8; 16];
    expected[0] = 9;
    assert_eq!(alias.to_vec(), expected);
}

#[test]
fn test_round_trip_3d() {
    fastrand::seed(99);
    let size = Size::new([7, 3, 4]);
    let data: Vec<i64> = (0..size.len()).map(|_| fastrand::i64(..)).collect();
    let host = HostBuffer::<i64, 3>::from_slice(size, &data).unwrap();

    let mut dev = DeviceBuffer::<i64, 3>::new(size).unwrap();
    assert_eq!(dev.pitch(), Pitch::<3>::new(256, 768));
    dev.assign_from_host(&host).unwrap();

    let mut dev2 = DeviceBuffer::<i64, 3>::new(size).unwrap();
    dev2.copy_from(&dev).unwrap();

    let mut back = HostBuffer::<i64, 3>::new(size).unwrap();
    back.assign_from_accelerator(&dev2).unwrap();
    assert_eq!(back.to_vec(), data);
}

#[test]
fn test_transfer_into_host_view() {
    let mut src = DeviceBuffer::<u16, 2>::new(Size::new([2, 2])).unwrap();
    src.assign(7).unwrap();

    let host = HostBuffer::<u16, 2>::new(Size::new([4, 4])).unwrap();
    let mut window = host.view([1, 1], Size::new([2, 2])).unwrap();
    window.assign_from_accelerator(&src).unwrap();

    #[rustfmt::skip]
    let expected = vec![
        0, 0, 0, 0,
        0, 7, 7, 0,
        0, 7, 7, 0,
        0, 0, 0, 0,
    ];
    assert_eq!(host.to_vec(), expected);
}

#[test]
fn test_empty_transfer() {
    let src = DeviceBuffer::<f32, 2>::new(Size::new([0, 4])).unwrap();
    let mut dst = HostBuffer::<f32, 2>::new(Size::new([0, 4])).unwrap();
    assert!(dst.is_empty());
    dst.assign_from_accelerator(&src).unwrap();
    assert!(dst.to_vec().is_empty());
}

#[test]
fn test_engine_failure_is_propagated() {
    let src = RawDeviceRegion {
        data: (0..8).collect(),
        size: Size::new([4, 2]),
        pitch: Pitch::<2>::new(8),
    };
    let mut dst = HostBuffer::<u32, 2>::from_slice(Size::new([4, 2]), &[9; 8]).unwrap();
    let e = dst.assign_from_accelerator(&src).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::Transfer { .. }));
    assert!(!e.is_invalid_arg());
    assert_eq!(dst.to_vec(), vec![9; 8]);

    let src = RawDeviceRegion {
        pitch: Pitch::<2>::new(16),
        ..src
    };
    dst.assign_from_accelerator(&src).unwrap();
    assert_eq!(dst.to_vec(), (0..8).collect::<Vec<u32>>());
}
