use std::sync::Arc;

use mapview_bytes::AlignedBytes;

use crate::{Char16, ErrorKind, MappedView, RecordLayout, Region, copy, make_region, raw};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    x: f32,
    y: f32,
    z: f32,
    color: u32,
}

const X: usize = 0;
const Y: usize = 4;
const Z: usize = 8;
const COLOR: usize = 12;

#[test]
fn test_bind_succeeds_for_valid_layouts() {
    for _ in 0..200 {
        let align = fastrand::usize(1..=32);
        let stride = align * fastrand::usize(1..=8);
        let region = Region::zeroed_with_alignment(stride * 4, 64);
        // Move the position onto a multiple of `align` that is not necessarily
        // a power of two.
        let position = (0..=64)
            .find(|p| (region.start() + p) % align == 0)
            .unwrap();
        let region = region.with_position(position);

        let view = MappedView::bound(&region, align, stride).unwrap();
        assert_eq!(view.current_index(), 0);
        assert_eq!(view.base_address() % align, 0);
        assert_eq!(view.stride() % view.align(), 0);
    }
}

#[test]
fn test_select_is_inverse_of_current_index() {
    let region = Region::zeroed(4096);
    let mut view = MappedView::bound(&region, 4, 12).unwrap();
    let records = view.record_capacity();
    for _ in 0..1000 {
        let i = fastrand::usize(..records);
        assert_eq!(view.select(i).current_index(), i);
    }
}

#[test]
fn test_bind_errors_are_total() {
    let region = Region::zeroed(256);
    for stride in 1..64usize {
        let err = MappedView::bound(&region, 0, stride).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidAlignment { align: 0 });
    }
    for align in 2..16usize {
        for stride in (1..64usize).filter(|s| s % align != 0) {
            let err = MappedView::bound(&region, align, stride).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MisalignedSize { size: stride, align });
        }
    }
    for position in (1..64usize).filter(|p| p % 8 != 0) {
        let region = region.clone().with_position(position);
        let err = MappedView::bound(&region, 8, 16).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MisalignedAddress { .. }));
    }
}

#[test]
fn test_per_record_isolation() {
    // 40-byte region of four 10-byte records.
    let region = Region::zeroed(40);
    let mut view = MappedView::bound(&region, 2, 10).unwrap();

    view.select(3);
    assert_eq!(view.view_address(), view.base_address() + 30);
    unsafe {
        raw::put_i32(view.view_address(), 42);
        assert_eq!(raw::get_i32(view.view_address()), 42);
    }

    view.select(0);
    unsafe {
        assert_eq!(raw::get_i32(view.view_address()), 0);
        raw::put_i32(view.view_address(), 7);
    }

    view.select(3);
    assert_eq!(unsafe { raw::get_i32(view.view_address()) }, 42);
}

#[test]
fn test_misaligned_size_scenario() {
    let region = Region::zeroed(40);
    let err = MappedView::bound(&region, 4, 10).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MisalignedSize { size: 10, align: 4 });
}

#[test]
fn test_vertex_loop() {
    const COUNT: usize = 256;
    let region = Region::new(AlignedBytes::zeroed_for::<Vertex>(COUNT));
    let mut view = MappedView::bound_to::<Vertex>(&region).unwrap();
    assert_eq!(view.record_capacity(), COUNT);

    for i in 0..COUNT {
        view.select(i);
        unsafe {
            view.put(X, i as f32);
            view.put(Y, i as f32 * 2.0);
            view.put(Z, -(i as f32));
            view.put(COLOR, i as u32 | 0xFF00_0000);
        }
    }

    let vertices: &[Vertex] = bytemuck::cast_slice(unsafe { region.as_slice() });
    for (i, vertex) in vertices.iter().enumerate() {
        assert_eq!(
            *vertex,
            Vertex {
                x: i as f32,
                y: i as f32 * 2.0,
                z: -(i as f32),
                color: i as u32 | 0xFF00_0000,
            }
        );
    }
}

#[test]
fn test_duplicate_and_slice_share_memory() {
    let region = Region::zeroed(16 * 8);
    let mut view = MappedView::bound(&region, 8, 16).unwrap();
    view.select(4);

    let mut dup = view.duplicate().unwrap();
    let mut sliced = view.slice().unwrap();

    unsafe {
        dup.select(5).put::<u64>(0, 0xAAAA);
        assert_eq!(sliced.select(1).get::<u64>(0), 0xAAAA);
        sliced.put::<f64>(8, 3.0);
        assert_eq!(view.select(5).get::<f64>(8), 3.0);
    }
    assert_eq!(dup.current_index(), 5);
    assert_eq!(sliced.current_index(), 1);
}

#[test]
fn test_copy_between_views() {
    let src_region = Region::zeroed(64);
    let dst_region = Region::zeroed(64);
    let mut src = MappedView::bound(&src_region, 4, 16).unwrap();
    let mut dst = MappedView::bound(&dst_region, 4, 16).unwrap();

    let data: Vec<u8> = (0..16).map(|_| fastrand::u8(..)).collect();
    src.select(1);
    for (i, &b) in data.iter().enumerate() {
        unsafe { raw::put::<u8>(src.field_address(i), b) };
    }

    dst.select(2);
    unsafe { copy(&src, &dst, 16) };

    let bytes = unsafe { dst_region.as_slice() };
    assert_eq!(&bytes[32..48], data.as_slice());
    assert!(bytes[..32].iter().all(|&b| b == 0));
    assert!(bytes[48..].iter().all(|&b| b == 0));
}

#[test]
fn test_copy_within_region() {
    let region = Region::zeroed(32);
    let mut src = MappedView::bound(&region, 4, 8).unwrap();
    let mut dst = src.duplicate().unwrap();
    unsafe {
        src.select(0).put::<i64>(0, -99);
        dst.select(3);
        copy(&src, &dst, 8);
        assert_eq!(dst.get::<i64>(0), -99);
    }
}

#[test]
fn test_copy_zero_bytes() {
    let region = Region::zeroed(8);
    let view = MappedView::bound(&region, 1, 1).unwrap();
    let other = view.duplicate().unwrap();
    unsafe { copy(&view, &other, 0) };
}

#[test]
fn test_views_keep_memory_alive() {
    let owner = Arc::new(AlignedBytes::zeroed(64));
    let region = Region::from_owner(owner.clone());
    let view = MappedView::bound(&region, 8, 8).unwrap();
    let sliced = view.slice().unwrap();
    drop(region);
    drop(view);
    assert_eq!(Arc::strong_count(&owner), 2);

    drop(owner);
    unsafe {
        sliced.put::<u64>(0, 11);
        assert_eq!(sliced.get::<u64>(0), 11);
    }
    assert_eq!(Arc::strong_count(sliced.region().unwrap().owner()), 1);
}

#[test]
fn test_make_region_reinterprets_sub_range() {
    let region = Region::zeroed(64);
    let mut view = MappedView::bound(&region, 4, 16).unwrap();
    view.select(2);
    unsafe { view.put(0, Char16::from_char('q').unwrap()) };

    let foreign = unsafe { make_region(view.view_address(), 32) };
    let inner = MappedView::bound(&foreign, 2, 2).unwrap();
    assert_eq!(inner.base_address(), view.view_address());
    assert_eq!(inner.record_capacity(), 16);
    assert_eq!(unsafe { inner.get::<Char16>(0) }.to_char(), Some('q'));
}

#[test]
fn test_bind_layout() {
    let region = Region::zeroed(64);
    let layout = RecordLayout::new(4, 12).unwrap();
    let mut view = MappedView::new();
    view.bind_layout(&region, layout).unwrap();
    assert_eq!(view.stride(), 12);
    assert_eq!(view.record_capacity(), 5);
    assert!(view.bind_layout(&region, layout).unwrap_err().is_already_bound());
}

#[test]
fn test_views_across_threads() {
    let region = Region::zeroed(4 * 1024);
    let view = MappedView::bound(&region, 4, 4).unwrap();

    std::thread::scope(|scope| {
        for part in 0..4usize {
            let mut local = view.duplicate().unwrap();
            local.select(part * 256);
            let mut local = local.slice().unwrap();
            scope.spawn(move || {
                for i in 0..256 {
                    unsafe { local.select(i).put::<u32>(0, (part * 256 + i) as u32) };
                }
            });
        }
    });

    let values: &[u32] = bytemuck::cast_slice(unsafe { region.as_slice() });
    assert!(values.iter().enumerate().all(|(i, &v)| v == i as u32));
}
