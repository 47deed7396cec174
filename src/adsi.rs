//! [`Directory`] over ADSI, the COM object model of the IIS metabase.
//!
//! Nodes are `IADs` interface pointers. Reference counting is handled by the
//! `windows` crate; every COM failure is turned into a [`HostError`] carrying
//! the HRESULT.

use std::ffi::c_void;

use tracing::debug;
use windows::core::{Interface, BSTR, GUID, HRESULT, HSTRING, PCWSTR, VARIANT};
use windows::Win32::Networking::ActiveDirectory::{ADsGetObject, IADs, IADsContainer};
use windows::Win32::System::Com::{
    CoInitializeEx, CoUninitialize, IDispatch, COINIT_APARTMENTTHREADED, DISPATCH_METHOD,
    DISPPARAMS,
};
use windows::Win32::System::Ole::IEnumVARIANT;
use windows::Win32::System::Variant::{VT_BOOL, VT_EMPTY, VT_I4};

use crate::directory::{Child, Directory};
use crate::error::HostError;
use crate::types::{AppProtection, PropertyValue, IIS_SERVICE_PATH};

const LOCALE_USER_DEFAULT: u32 = 0x0400;
const E_ADS_PROPERTY_NOT_FOUND: HRESULT = HRESULT(0x8000_500Du32 as i32);
const S_FALSE: HRESULT = HRESULT(1);
const RPC_E_CHANGED_MODE: HRESULT = HRESULT(0x8001_0106u32 as i32);

fn host_error(e: windows::core::Error) -> HostError {
    HostError::new(e.code().0 as u32, e.message().to_string())
}

/// Owns the COM apartment for the lifetime of the connection.
pub struct AdsiDirectory {
    initialized: bool,
}

impl AdsiDirectory {
    pub fn new() -> Result<Self, HostError> {
        // SAFETY: initializes COM for the calling thread; balanced in Drop.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        if hr.is_ok() {
            // S_OK or S_FALSE both need a matching CoUninitialize
            debug!(already = hr == S_FALSE, "COM initialized");
            Ok(Self { initialized: true })
        } else if hr == RPC_E_CHANGED_MODE {
            Ok(Self { initialized: false })
        } else {
            Err(host_error(hr.into()))
        }
    }
}

impl Drop for AdsiDirectory {
    fn drop(&mut self) {
        if self.initialized {
            // SAFETY: paired with the successful CoInitializeEx in new().
            unsafe { CoUninitialize() };
        }
    }
}

fn bstr(s: &str) -> BSTR {
    BSTR::from(s)
}

fn container(node: &IADs) -> Result<IADsContainer, HostError> {
    node.cast::<IADsContainer>().map_err(host_error)
}

fn to_property(value: &VARIANT) -> Result<Option<PropertyValue>, HostError> {
    let vt = value.vt();
    let property = if vt == VT_EMPTY {
        return Ok(None);
    } else if vt == VT_BOOL {
        PropertyValue::Bool(bool::try_from(value).map_err(host_error)?)
    } else if vt == VT_I4 {
        PropertyValue::Int(i32::try_from(value).map_err(host_error)?)
    } else {
        // BSTR, or anything the variant can coerce to one
        PropertyValue::Str(BSTR::try_from(value).map_err(host_error)?.to_string())
    };
    Ok(Some(property))
}

fn to_variant(value: PropertyValue) -> VARIANT {
    match value {
        PropertyValue::Str(s) => VARIANT::from(BSTR::from(s.as_str())),
        PropertyValue::Bool(b) => VARIANT::from(b),
        PropertyValue::Int(i) => VARIANT::from(i),
    }
}

/// Calls a dispatch method by name with positional arguments.
unsafe fn invoke(object: &IDispatch, method: &str, mut args: Vec<VARIANT>) -> windows::core::Result<()> {
    let name = HSTRING::from(method);
    let names = [PCWSTR(name.as_ptr())];
    let mut dispid = 0i32;
    object.GetIDsOfNames(&GUID::zeroed(), names.as_ptr(), 1, LOCALE_USER_DEFAULT, &mut dispid)?;

    // DISPPARAMS takes arguments right to left
    args.reverse();
    let params = DISPPARAMS {
        rgvarg: args.as_mut_ptr(),
        rgdispidNamedArgs: std::ptr::null_mut(),
        cArgs: args.len() as u32,
        cNamedArgs: 0,
    };
    let mut result = VARIANT::default();
    object.Invoke(
        dispid,
        &GUID::zeroed(),
        LOCALE_USER_DEFAULT,
        DISPATCH_METHOD,
        &params,
        Some(&mut result as *mut _),
        None,
        None,
    )
}

impl Directory for AdsiDirectory {
    type Node = IADs;

    fn service(&mut self) -> Result<IADs, HostError> {
        let path = HSTRING::from(IIS_SERVICE_PATH);
        let mut object: Option<IADs> = None;
        // SAFETY: `object` receives an interface of the requested IID or stays None.
        unsafe {
            ADsGetObject(
                PCWSTR(path.as_ptr()),
                &IADs::IID,
                &mut object as *mut _ as *mut *mut c_void,
            )
            .map_err(host_error)?;
        }
        object.ok_or_else(|| HostError::new(0x8000_4005, "ADsGetObject returned no object"))
    }

    fn children(&mut self, parent: &IADs) -> Result<Vec<Child<IADs>>, HostError> {
        let container = container(parent)?;
        let mut children = Vec::new();
        // SAFETY: enumeration of a live container; VARIANTs are owned and
        // released by the windows crate.
        unsafe {
            let enumerator: IEnumVARIANT = container
                ._NewEnum()
                .and_then(|unknown| unknown.cast())
                .map_err(host_error)?;
            loop {
                let mut items = [VARIANT::default()];
                let mut fetched = 0u32;
                enumerator.Next(&mut items, &mut fetched).ok().map_err(host_error)?;
                if fetched == 0 {
                    break;
                }
                let node: IADs = windows::core::IUnknown::try_from(&items[0])
                    .and_then(|unknown| unknown.cast())
                    .map_err(host_error)?;
                children.push(Child {
                    class: node.Class().map_err(host_error)?.to_string(),
                    name: node.Name().map_err(host_error)?.to_string(),
                    path: node.ADsPath().map_err(host_error)?.to_string(),
                    node,
                });
            }
        }
        Ok(children)
    }

    fn get(&mut self, node: &IADs, property: &str) -> Result<Option<PropertyValue>, HostError> {
        // SAFETY: reads through a live IADs pointer.
        match unsafe { node.Get(&bstr(property)) } {
            Ok(value) => to_property(&value),
            Err(e) if e.code() == E_ADS_PROPERTY_NOT_FOUND => Ok(None),
            Err(e) => Err(host_error(e)),
        }
    }

    fn set(&mut self, node: &IADs, property: &str, value: PropertyValue) -> Result<(), HostError> {
        // SAFETY: writes to the property cache of a live IADs pointer.
        unsafe { node.Put(&bstr(property), &to_variant(value)) }.map_err(host_error)
    }

    fn create(&mut self, parent: &IADs, class: &str, name: &str) -> Result<IADs, HostError> {
        let container = container(parent)?;
        // SAFETY: Create returns a new dispatch object owned by the caller.
        unsafe {
            container
                .Create(&bstr(class), &bstr(name))
                .and_then(|object| object.cast())
                .map_err(host_error)
        }
    }

    fn delete(&mut self, parent: &IADs, class: &str, name: &str) -> Result<(), HostError> {
        let container = container(parent)?;
        // SAFETY: removes a child of a live container.
        unsafe { container.Delete(&bstr(class), &bstr(name)) }.map_err(host_error)
    }

    fn commit(&mut self, node: &IADs) -> Result<(), HostError> {
        // SAFETY: flushes the property cache of a live IADs pointer.
        unsafe { node.SetInfo() }.map_err(host_error)
    }

    fn create_application(
        &mut self,
        node: &IADs,
        protection: AppProtection,
    ) -> Result<(), HostError> {
        let object: IDispatch = node.cast().map_err(host_error)?;
        // SAFETY: AppCreate2 takes a single integer argument.
        unsafe { invoke(&object, "AppCreate2", vec![VARIANT::from(protection as i32)]) }
            .map_err(host_error)
    }
}
