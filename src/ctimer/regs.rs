//! CTIMER register block.
//!
//! Layout of one standard counter/timer instance (LPC55S6x UM11126, chapter 21).
//! Only the registers the PWM driver touches have accessors.

use core::marker::PhantomData;
use core::ptr;

/// Size of one register block, in 32-bit words.
pub const BLOCK_WORDS: usize = 0x88 / 4;

const TCR: usize = 0x04;
const TC: usize = 0x08;
const PR: usize = 0x0c;
const PC: usize = 0x10;
const MCR: usize = 0x14;
const MR0: usize = 0x18;
const CTCR: usize = 0x70;
const PWMC: usize = 0x74;

/// A 32-bit memory-mapped register holding a value of type `T`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Reg<T: Copy> {
    ptr: *mut u32,
    phantom: PhantomData<*mut T>,
}

unsafe impl<T: Copy> Send for Reg<T> {}
unsafe impl<T: Copy> Sync for Reg<T> {}

impl<T: Copy + From<u32> + Into<u32>> Reg<T> {
    const fn from_ptr(ptr: *mut u32) -> Self {
        Self {
            ptr,
            phantom: PhantomData,
        }
    }

    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u32 {
        self.ptr
    }

    #[inline(always)]
    pub fn read(&self) -> T {
        unsafe { T::from(ptr::read_volatile(self.ptr)) }
    }

    #[inline(always)]
    pub fn write_value(&self, val: T) {
        unsafe { ptr::write_volatile(self.ptr, val.into()) }
    }

    #[inline(always)]
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default,
    {
        let mut val = T::default();
        let res = f(&mut val);
        self.write_value(val);
        res
    }

    #[inline(always)]
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut val = self.read();
        let res = f(&mut val);
        self.write_value(val);
        res
    }
}

/// Standard counter/timer register block.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Ctimer {
    ptr: *mut u8,
}

unsafe impl Send for Ctimer {}
unsafe impl Sync for Ctimer {}

impl Ctimer {
    /// # Safety
    ///
    /// `ptr` must point to a register block (or RAM) of at least
    /// [`BLOCK_WORDS`] 32-bit words that stays valid for as long as the
    /// returned handle is used, and nothing else may access it concurrently.
    #[inline(always)]
    pub const unsafe fn from_ptr(ptr: *mut ()) -> Self {
        Self { ptr: ptr as _ }
    }

    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut () {
        self.ptr as _
    }

    #[inline(always)]
    const fn reg<T: Copy + From<u32> + Into<u32>>(self, offset: usize) -> Reg<T> {
        unsafe { Reg::from_ptr(self.ptr.add(offset) as *mut u32) }
    }

    /// Timer Control Register
    #[inline(always)]
    pub const fn tcr(self) -> Reg<Tcr> {
        self.reg(TCR)
    }

    /// Timer Counter
    #[inline(always)]
    pub const fn tc(self) -> Reg<u32> {
        self.reg(TC)
    }

    /// Prescale Register
    #[inline(always)]
    pub const fn pr(self) -> Reg<u32> {
        self.reg(PR)
    }

    /// Prescale Counter
    #[inline(always)]
    pub const fn pc(self) -> Reg<u32> {
        self.reg(PC)
    }

    /// Match Control Register
    #[inline(always)]
    pub const fn mcr(self) -> Reg<Mcr> {
        self.reg(MCR)
    }

    /// Match Register `n`, 0 to 3
    #[inline(always)]
    pub const fn mr(self, n: usize) -> Reg<u32> {
        assert!(n < 4);
        self.reg(MR0 + n * 4)
    }

    /// Count Control Register
    #[inline(always)]
    pub const fn ctcr(self) -> Reg<Ctcr> {
        self.reg(CTCR)
    }

    /// PWM Control Register
    #[inline(always)]
    pub const fn pwmc(self) -> Reg<Pwmc> {
        self.reg(PWMC)
    }
}

/// Timer Control Register
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Tcr(pub u32);

impl Tcr {
    /// Counter enable.
    #[inline(always)]
    pub const fn cen(&self) -> bool {
        self.0 & 0x01 != 0
    }
    #[inline(always)]
    pub fn set_cen(&mut self, val: bool) {
        self.0 = (self.0 & !0x01) | (val as u32);
    }
    /// Counter reset, holds TC and PC at zero while set.
    #[inline(always)]
    pub const fn crst(&self) -> bool {
        self.0 & 0x02 != 0
    }
    #[inline(always)]
    pub fn set_crst(&mut self, val: bool) {
        self.0 = (self.0 & !0x02) | ((val as u32) << 1);
    }
}

/// Match Control Register
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Mcr(pub u32);

impl Mcr {
    /// Interrupt on MRn match.
    #[inline(always)]
    pub const fn mri(&self, n: usize) -> bool {
        assert!(n < 4);
        self.0 & (1 << (n * 3)) != 0
    }
    #[inline(always)]
    pub fn set_mri(&mut self, n: usize, val: bool) {
        assert!(n < 4);
        let offs = n * 3;
        self.0 = (self.0 & !(1 << offs)) | ((val as u32) << offs);
    }
    /// Reset TC on MRn match.
    #[inline(always)]
    pub const fn mrr(&self, n: usize) -> bool {
        assert!(n < 4);
        self.0 & (1 << (n * 3 + 1)) != 0
    }
    #[inline(always)]
    pub fn set_mrr(&mut self, n: usize, val: bool) {
        assert!(n < 4);
        let offs = n * 3 + 1;
        self.0 = (self.0 & !(1 << offs)) | ((val as u32) << offs);
    }
    /// Stop TC on MRn match.
    #[inline(always)]
    pub const fn mrs(&self, n: usize) -> bool {
        assert!(n < 4);
        self.0 & (1 << (n * 3 + 2)) != 0
    }
    #[inline(always)]
    pub fn set_mrs(&mut self, n: usize, val: bool) {
        assert!(n < 4);
        let offs = n * 3 + 2;
        self.0 = (self.0 & !(1 << offs)) | ((val as u32) << offs);
    }
}

/// Count Control Register
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Ctcr(pub u32);

impl Ctcr {
    /// Counter/timer mode, 0 = timer mode (every rising PCLK edge).
    #[inline(always)]
    pub const fn ctmode(&self) -> u8 {
        (self.0 & 0x03) as u8
    }
    #[inline(always)]
    pub fn set_ctmode(&mut self, val: u8) {
        self.0 = (self.0 & !0x03) | ((val as u32) & 0x03);
    }
}

/// PWM Control Register
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Pwmc(pub u32);

impl Pwmc {
    /// PWM mode enable for match output `n`.
    #[inline(always)]
    pub const fn pwmen(&self, n: usize) -> bool {
        assert!(n < 4);
        self.0 & (1 << n) != 0
    }
    #[inline(always)]
    pub fn set_pwmen(&mut self, n: usize, val: bool) {
        assert!(n < 4);
        self.0 = (self.0 & !(1 << n)) | ((val as u32) << n);
    }
}

macro_rules! impl_raw_conv {
    ($($ty:ident),*) => {
        $(
            impl From<u32> for $ty {
                #[inline(always)]
                fn from(val: u32) -> $ty {
                    $ty(val)
                }
            }

            impl From<$ty> for u32 {
                #[inline(always)]
                fn from(val: $ty) -> u32 {
                    val.0
                }
            }
        )*
    };
}

impl_raw_conv!(Tcr, Mcr, Ctcr, Pwmc);
