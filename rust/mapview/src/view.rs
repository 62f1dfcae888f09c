//! Mapped views: repositionable handles to one record within a bound region.

use mapview_common::{Error, Result, result::verify};

use crate::layout::RecordLayout;
use crate::raw;
use crate::region::Region;
use crate::scalar::Scalar;

/// A handle that addresses one fixed-size record within a [`Region`].
///
/// A view is created unbound ([`MappedView::new`]) and bound exactly once
/// ([`MappedView::bind`]). After that it can be moved across the record array
/// with [`MappedView::select`], and new views can be derived from it with
/// [`MappedView::duplicate`] (same origin) and [`MappedView::slice`] (origin at
/// the current record).
///
/// For every bound view:
/// - `view_address >= base_address` and `view_address - base_address` is a
///   multiple of `stride`;
/// - `base_address` and `stride` are multiples of `align`;
/// - the view holds its region, so the addressed memory stays alive.
///
/// `select` performs no upper-bound check against the number of records in the
/// region; debug builds assert that the selected record starts within the
/// region.
#[derive(Default)]
pub struct MappedView {
    base_address: usize,
    view_address: usize,
    stride: usize,
    align: usize,
    backing: Option<Region>,
}

impl MappedView {
    /// Creates an unbound view.
    pub fn new() -> MappedView {
        MappedView::default()
    }

    /// Creates a view bound to `region`.
    pub fn bound(region: &Region, align: usize, record_size: usize) -> Result<MappedView> {
        let mut view = MappedView::new();
        view.bind(region, align, record_size)?;
        Ok(view)
    }

    /// Creates a view bound to `region` with the natural layout of `T`.
    pub fn bound_to<T>(region: &Region) -> Result<MappedView>
    where
        T: bytemuck::Pod,
    {
        let mut view = MappedView::new();
        view.bind_layout(region, RecordLayout::of::<T>())?;
        Ok(view)
    }

    /// Binds this view to the current position of `region`.
    ///
    /// Checks, in order:
    /// - `AlreadyBound` if the view already has a base address;
    /// - `NullRegion` if the region has no start address;
    /// - `InvalidRegion` if the region is not direct;
    /// - `InvalidAlignment` if `align` is zero;
    /// - `MisalignedSize` if `record_size` is not a positive multiple of `align`;
    /// - `MisalignedAddress` if `region.address()` is not a multiple of `align`.
    ///
    /// On success the view addresses record 0 at `region.address()` and holds a
    /// clone of `region`.
    pub fn bind(&mut self, region: &Region, align: usize, record_size: usize) -> Result<&mut Self> {
        let res = self
            .verify_unbound()
            .and_then(|_| verify_region(region))
            .and_then(|_| RecordLayout::new(align, record_size))
            .and_then(|layout| self.attach(region, layout));
        self.finish_bind(res)
    }

    /// Binds this view using a pre-validated layout. See [`MappedView::bind`].
    pub fn bind_layout(&mut self, region: &Region, layout: RecordLayout) -> Result<&mut Self> {
        let res = self
            .verify_unbound()
            .and_then(|_| verify_region(region))
            .and_then(|_| self.attach(region, layout));
        self.finish_bind(res)
    }

    /// Like [`MappedView::bind`], for a region that may be absent.
    ///
    /// A missing region fails with `NullRegion` (after the `AlreadyBound` check).
    pub fn bind_opt(
        &mut self,
        region: Option<&Region>,
        align: usize,
        record_size: usize,
    ) -> Result<&mut Self> {
        match region {
            Some(region) => self.bind(region, align, record_size),
            None => {
                let res = self.verify_unbound().and_then(|_| Err(Error::null_region()));
                self.finish_bind(res)
            }
        }
    }

    /// Repositions the view to record `index`.
    ///
    /// Release builds do not check `index`. Debug builds assert that it is at
    /// most [`MappedView::record_capacity`] (one past the last record is
    /// allowed), so `current_index(select(i)) == i` holds in debug builds only
    /// for such `i`.
    #[inline]
    pub fn select(&mut self, index: usize) -> &mut Self {
        debug_assert!(self.is_bound(), "select on an unbound view");
        debug_assert!(
            index <= self.record_capacity(),
            "record index {index} beyond region ({} records)",
            self.record_capacity()
        );
        self.view_address = self.base_address + index * self.stride;
        self
    }

    /// Index of the current record; the inverse of [`MappedView::select`].
    ///
    /// Returns 0 for an unbound view.
    #[inline]
    pub fn current_index(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }
        (self.view_address - self.base_address) / self.stride
    }

    /// Makes `dst` a view with the same origin, position, layout and region as
    /// this one. The two views move independently afterwards.
    ///
    /// # Errors
    ///
    /// `NotBound` if this view is unbound; `AlreadyBound` if `dst` is bound.
    pub fn duplicate_into<'a>(&self, dst: &'a mut MappedView) -> Result<&'a mut MappedView> {
        self.derive_into(dst, self.base_address)?;
        log::trace!(
            "duplicate: base={:#x}, view={:#x}",
            dst.base_address,
            dst.view_address
        );
        Ok(dst)
    }

    /// Makes `dst` a view whose record 0 is this view's current record.
    ///
    /// # Errors
    ///
    /// `NotBound` if this view is unbound; `AlreadyBound` if `dst` is bound.
    pub fn slice_into<'a>(&self, dst: &'a mut MappedView) -> Result<&'a mut MappedView> {
        self.derive_into(dst, self.view_address)?;
        log::trace!("slice: base={:#x}", dst.base_address);
        Ok(dst)
    }

    /// Returns a new view with the same origin and position as this one.
    pub fn duplicate(&self) -> Result<MappedView> {
        let mut dst = MappedView::new();
        self.duplicate_into(&mut dst)?;
        Ok(dst)
    }

    /// Returns a new view whose record 0 is this view's current record.
    pub fn slice(&self) -> Result<MappedView> {
        let mut dst = MappedView::new();
        self.slice_into(&mut dst)?;
        Ok(dst)
    }

    /// Creates a region over `capacity` bytes starting at the current record.
    ///
    /// The region shares this view's memory owner, so the bytes stay alive for
    /// as long as the region (or anything bound to it) does.
    ///
    /// # Errors
    ///
    /// `NotBound` if this view is unbound; `RangeOutOfBounds` if the range does
    /// not lie within the bound region.
    pub fn region_at(&self, capacity: usize) -> Result<Region> {
        let region = self.backing.as_ref().ok_or_else(Error::not_bound)?;
        let offset = self.view_address.wrapping_sub(region.start());
        let in_bounds = self.view_address >= region.start()
            && offset
                .checked_add(capacity)
                .is_some_and(|end| end <= region.capacity());
        verify(in_bounds, || {
            Error::range_out_of_bounds(offset, capacity, region.capacity())
        })?;
        Ok(region.sub_region(offset, capacity))
    }

    /// Address of the field at `offset` bytes into the current record.
    #[inline]
    pub fn field_address(&self, offset: usize) -> usize {
        self.view_address + offset
    }

    /// Loads the `T` at `offset` bytes into the current record.
    ///
    /// # Safety
    ///
    /// The field must lie within the region, and must not be concurrently
    /// written.
    #[inline]
    pub unsafe fn get<T: Scalar>(&self, offset: usize) -> T {
        unsafe { raw::get(self.field_address(offset)) }
    }

    /// Stores `value` at `offset` bytes into the current record.
    ///
    /// # Safety
    ///
    /// The field must lie within the region, and must not be concurrently
    /// accessed.
    #[inline]
    pub unsafe fn put<T: Scalar>(&self, offset: usize, value: T) {
        unsafe { raw::put(self.field_address(offset), value) }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.base_address != 0
    }

    /// Address of record 0.
    #[inline]
    pub fn base_address(&self) -> usize {
        self.base_address
    }

    /// Address of the current record.
    #[inline]
    pub fn view_address(&self) -> usize {
        self.view_address
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// The region this view is bound to.
    pub fn region(&self) -> Option<&Region> {
        self.backing.as_ref()
    }

    /// Number of whole records between the base address and the end of the
    /// bound region. Zero for an unbound view.
    pub fn record_capacity(&self) -> usize {
        match &self.backing {
            Some(region) if self.stride != 0 => {
                let end = region.start() + region.capacity();
                end.saturating_sub(self.base_address) / self.stride
            }
            _ => 0,
        }
    }
}

impl MappedView {
    fn verify_unbound(&self) -> Result<()> {
        let base = self.base_address;
        verify(base == 0, || Error::already_bound(base))
    }

    fn attach(&mut self, region: &Region, layout: RecordLayout) -> Result<()> {
        let address = region.address();
        verify(address.is_multiple_of(layout.align()), || {
            Error::misaligned_address(address, layout.align())
        })?;
        self.base_address = address;
        self.view_address = address;
        self.stride = layout.stride();
        self.align = layout.align();
        self.backing = Some(region.clone());
        Ok(())
    }

    fn finish_bind(&mut self, res: Result<()>) -> Result<&mut Self> {
        match res {
            Ok(()) => {
                log::trace!(
                    "bind: base={:#x}, stride={}, align={}",
                    self.base_address,
                    self.stride,
                    self.align
                );
                Ok(self)
            }
            Err(e) => {
                log::debug!("bind rejected: {e}");
                Err(e)
            }
        }
    }

    fn derive_into(&self, dst: &mut MappedView, base_address: usize) -> Result<()> {
        dst.verify_unbound()?;
        let backing = self.backing.as_ref().ok_or_else(Error::not_bound)?;
        dst.base_address = base_address;
        dst.view_address = self.view_address;
        dst.stride = self.stride;
        dst.align = self.align;
        dst.backing = Some(backing.clone());
        Ok(())
    }
}

fn verify_region(region: &Region) -> Result<()> {
    verify(!region.is_null(), Error::null_region)?;
    verify(region.is_direct(), || {
        Error::invalid_region("region does not have a stable address")
    })
}

impl std::fmt::Debug for MappedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedView")
            .field("base_address", &format_args!("{:#x}", self.base_address))
            .field("view_address", &format_args!("{:#x}", self.view_address))
            .field("stride", &self.stride)
            .field("align", &self.align)
            .finish_non_exhaustive()
    }
}
